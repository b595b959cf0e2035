use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::{info, warn};

use crate::error::SeatError;
use crate::tools::{ToolBox, ToolRequest, ToolResponse};

/// Serve line-delimited JSON requests until `input` is exhausted.
///
/// Each non-blank line is `{"tool": ..., "arguments": {...}}` and produces exactly
/// one response line. Returns the number of requests answered.
pub fn serve<R: BufRead, W: Write>(toolbox: &mut ToolBox, mut input: R, mut output: W) -> Result<usize> {
    info!("tool server ready on stdio");
    let mut answered = 0;

    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if input.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }

        let response = match String::from_utf8(std::mem::take(&mut buffer)) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match serde_json::from_str::<ToolRequest>(line.trim()) {
                Ok(request) => toolbox.handle(request),
                Err(err) => {
                    warn!(error = %err, "unparseable request");
                    ToolResponse::failure(
                        None,
                        &SeatError::validation(format!("invalid request: {err}")),
                    )
                }
            },
            Err(_) => {
                warn!("request line is not valid UTF-8");
                ToolResponse::failure(None, &SeatError::validation("request line is not valid UTF-8"))
            }
        };

        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
        answered += 1;
    }

    info!(answered, "input closed, shutting down");
    Ok(answered)
}
