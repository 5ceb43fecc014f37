use std::io::{self, Write};

pub fn write_stdout_text(body: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(body.as_bytes())?;
    if !body.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()
}
