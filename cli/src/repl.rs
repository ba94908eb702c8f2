use std::io::{self, BufRead, Write};

/// Prompt and read one line. `None` on end of input.
pub fn readline() -> Result<Option<String>, String> {
    write!(io::stdout(), "statclock> ").map_err(|e| e.to_string())?;
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut buffer = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
