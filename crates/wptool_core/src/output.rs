use std::io::{self, ErrorKind, Write};
use std::time::Instant;

use tracing::debug;

use crate::dispatch::Output;

/// Write `output` to stdout, then the elapsed time to stderr.
///
/// A reader that closed the pipe early is not an error: the write failure is
/// swallowed and the timing line is still produced.
pub fn emit(start: Instant, output: &Output) {
    let stdout = io::stdout();
    let stderr = io::stderr();
    emit_to(start, output, &mut stdout.lock(), &mut stderr.lock());
}

pub fn emit_to<W, E>(start: Instant, output: &Output, out: &mut W, err: &mut E)
where
    W: Write,
    E: Write,
{
    let text = output.to_string();
    if let Err(error) = write_with_retry(out, text.as_bytes()) {
        debug!(%error, "stdout write abandoned");
    }

    let seconds = start.elapsed().as_secs_f64();
    let _ = writeln!(err, "\n\n{seconds:5.3} seconds");
    let _ = err.flush();
}

/// Write all of `bytes`, resuming after at most one transient failure from
/// the first byte not yet accepted.
fn write_with_retry<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    let mut retried = false;
    while written < bytes.len() {
        match out.write(&bytes[written..]) {
            Ok(0) => return Err(io::Error::from(ErrorKind::WriteZero)),
            Ok(count) => written += count,
            Err(error) if is_transient(&error) && !retried => retried = true,
            Err(error) => return Err(error),
        }
    }
    match out.flush() {
        Err(error) if is_transient(&error) && !retried => out.flush(),
        result => result,
    }
}

fn is_transient(error: &io::Error) -> bool {
    matches!(error.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
}
