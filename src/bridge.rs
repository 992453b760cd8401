//! Stdin/stdout JSON bridge over the search pipeline.
//!
//! Reads newline-delimited JSON `SearchRequest` messages and writes one
//! `SearchResult` line per request, in order. A line that is not a valid
//! request gets an empty result so callers can keep lines paired.
//!
//! Stdout is exclusively reserved for the JSON protocol; all diagnostic
//! output (tracing, logs) must be routed to stderr.

use place_search::{Pipeline, SearchRequest, SearchResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Serve requests from `reader` until EOF, writing results to `writer`.
///
/// # Errors
///
/// Returns an error only when reading input or writing output fails.
pub async fn run_bridge<R, W>(pipeline: &Pipeline, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut served = 0usize;

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let result = match serde_json::from_str::<SearchRequest>(trimmed) {
            Ok(request) => pipeline.search(&request).await,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse search request from stdin");
                SearchResult::empty()
            }
        };

        let json = serde_json::to_string(&result)?;
        write_line(&mut writer, &json).await?;
        served += 1;
    }

    tracing::info!(served, "stdin closed (EOF); shutting down bridge");
    Ok(())
}

/// Run the bridge on the process's stdin and stdout.
///
/// # Errors
///
/// Same as [`run_bridge`].
pub async fn run_stdio_bridge(pipeline: &Pipeline) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::BufWriter::new(tokio::io::stdout());
    run_bridge(pipeline, stdin, stdout).await
}

/// Write a single JSON line and flush.
async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, json: &str) -> Result<()> {
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use place_search::SearchConfig;

    async fn run(input: &str) -> Vec<serde_json::Value> {
        let pipeline = Pipeline::from_config(&SearchConfig::default()).expect("pipeline");
        let mut output = Vec::new();
        run_bridge(&pipeline, input.as_bytes(), &mut output)
            .await
            .expect("bridge");
        String::from_utf8(output)
            .expect("utf8")
            .lines()
            .map(|l| serde_json::from_str(l).expect("json line"))
            .collect()
    }

    #[tokio::test]
    async fn one_result_line_per_request() {
        let input = concat!(
            r#"{"inputKind":"text","textInput":"coffee","latitude":25.2,"longitude":55.3}"#,
            "\n\n",
            r#"{"inputKind":"text","textInput":"tea","latitude":1.0,"longitude":2.0,"radiusMeters":500}"#,
            "\n"
        );
        let out = run(input).await;
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v == &serde_json::json!({"locations": []})));
    }

    #[tokio::test]
    async fn malformed_line_gets_empty_result() {
        let out = run("not json\n").await;
        assert_eq!(out, vec![serde_json::json!({"locations": []})]);
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        assert!(run("").await.is_empty());
    }
}
