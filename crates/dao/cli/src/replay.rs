//! Message replay loop

use anyhow::Context;
use dao_runtime::{DaoProcess, HandleResult};
use dao_types::Message;
use std::io::{BufRead, Write};
use tracing::debug;

/// Counts for one replay run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub handled: usize,
    /// Messages answered with an `Error` record
    pub refused: usize,
}

/// Feed every non-blank input line to `process` as one host message and
/// write one `HandleResult` JSON line per message
pub fn replay<R: BufRead, W: Write>(
    process: &mut DaoProcess,
    input: R,
    mut output: W,
) -> anyhow::Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let msg: Message = serde_json::from_str(&line)
            .with_context(|| format!("Invalid message on line {}", index + 1))?;
        debug!(line = index + 1, from = %msg.from, "Replaying message");

        let reply = process.handle(&msg);
        if reply.is_error() {
            stats.refused += 1;
        }
        serde_json::to_writer(&mut output, &HandleResult::from(reply))?;
        writeln!(output)?;
        stats.handled += 1;
    }

    output.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_runtime::DaoConfig;
    use dao_types::{Environment, ProcessInfo};

    fn process() -> DaoProcess {
        DaoProcess::new(
            Environment::new(ProcessInfo::new("AOS", "FOOBAR")),
            DaoConfig::default(),
        )
    }

    #[test]
    fn test_replay_writes_one_line_per_message() {
        let input = [
            r#"{"From":"FOOBAR","Id":"init123","Block-Height":"1000","Tags":[{"name":"Action","value":"Init"}]}"#,
            "",
            r#"{"From":"AOS","Tags":[{"name":"Action","value":"Balance"}]}"#,
            r#"{"From":"NON_MEMBER","Tags":[{"name":"Action","value":"GetBalances"}]}"#,
        ]
        .join("\n");

        let mut process = process();
        let mut out = Vec::new();
        let stats = replay(&mut process, input.as_bytes(), &mut out).unwrap();
        assert_eq!(
            stats,
            ReplayStats {
                handled: 3,
                refused: 1
            }
        );

        let lines: Vec<HandleResult> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].output.is_none());
        assert_eq!(
            lines[1].output.as_ref().map(|o| o.data.as_str()),
            Some("Your balance is 10000000000000 DAO")
        );
    }

    #[test]
    fn test_replay_rejects_malformed_lines() {
        let mut process = process();
        let err = replay(&mut process, "not json".as_bytes(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
