// Local latency comparison for batchsort.
//
// Purpose:
// - Run both sorters over the same request document without an HTTP hop.
// - Emit one machine-readable JSON object on stdout.
//
// Design notes:
// - Timings are the sorters' own sort-phase measurements, same as the endpoints report.
// - Good enough for trend tracking, not lab-grade profiling.

use std::io::Read;
use std::path::PathBuf;

use serde_json::{Value, json};

use batchsort::api::{Error, ErrorKind, SortMode, SortRequest, decode_request, sort_batch};

#[derive(Clone, Debug)]
pub struct CompareArgs {
    pub input: Option<PathBuf>,
    pub rounds: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct ModeStats {
    min_ns: u64,
    total_ns: u128,
    rounds: u32,
}

impl ModeStats {
    fn record(&mut self, time_ns: u64) {
        self.min_ns = if self.rounds == 0 {
            time_ns
        } else {
            self.min_ns.min(time_ns)
        };
        self.total_ns += u128::from(time_ns);
        self.rounds += 1;
    }

    fn mean_ns(&self) -> u64 {
        if self.rounds == 0 {
            return 0;
        }
        u64::try_from(self.total_ns / u128::from(self.rounds)).unwrap_or(u64::MAX)
    }

    fn to_json(&self) -> Value {
        json!({ "min_ns": self.min_ns, "mean_ns": self.mean_ns() })
    }
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Error> {
    if args.rounds == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("--rounds must be greater than zero")
            .with_hint("Use a positive value like 5."));
    }
    let body = read_input(args.input.as_ref())?;
    let request = decode_request(&body)?;
    compare_request(&request, args.rounds)
}

fn compare_request(request: &SortRequest, rounds: u32) -> Result<Value, Error> {
    let batch = &request.to_sort;
    let mut single = ModeStats::default();
    let mut concurrent = ModeStats::default();
    let mut agree = true;

    for _ in 0..rounds {
        let single_outcome = sort_batch(SortMode::Single, batch)?;
        let concurrent_outcome = sort_batch(SortMode::Concurrent, batch)?;
        single.record(single_outcome.time_ns());
        concurrent.record(concurrent_outcome.time_ns());
        agree &= single_outcome.sorted == concurrent_outcome.sorted;
    }

    Ok(json!({
        "arrays": batch.len(),
        "elements": batch.iter().map(Vec::len).sum::<usize>(),
        "rounds": rounds,
        "single": single.to_json(),
        "concurrent": concurrent.to_json(),
        "agree": agree,
    }))
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>, Error> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message(format!("failed to read {}", path.display()))
                .with_source(err)
        }),
        _ => {
            let mut body = Vec::new();
            std::io::stdin().read_to_end(&mut body).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read stdin")
                    .with_source(err)
            })?;
            Ok(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CompareArgs, ModeStats, run_compare};
    use batchsort::api::ErrorKind;

    #[test]
    fn stats_track_min_and_mean() {
        let mut stats = ModeStats::default();
        for value in [30, 10, 20] {
            stats.record(value);
        }
        assert_eq!(stats.min_ns, 10);
        assert_eq!(stats.mean_ns(), 20);
        assert_eq!(ModeStats::default().mean_ns(), 0);
    }

    #[test]
    fn compare_reads_file_and_reports_agreement() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("batch.json");
        std::fs::write(&path, r#"{"to_sort":[[5,3,1],[2,2,2],[]]}"#).expect("write");

        let report = run_compare(CompareArgs {
            input: Some(path),
            rounds: 3,
        })
        .expect("compare");
        assert_eq!(report["arrays"], 3);
        assert_eq!(report["elements"], 6);
        assert_eq!(report["rounds"], 3);
        assert_eq!(report["agree"], true);
        assert!(report["single"]["min_ns"].is_u64());
        assert!(report["concurrent"]["mean_ns"].is_u64());
    }

    #[test]
    fn compare_rejects_zero_rounds() {
        let err = run_compare(CompareArgs {
            input: None,
            rounds: 0,
        })
        .expect_err("usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn compare_reports_missing_file_as_io() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = run_compare(CompareArgs {
            input: Some(temp.path().join("missing.json")),
            rounds: 1,
        })
        .expect_err("io error");
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn compare_rejects_malformed_document() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{\"to_sort\": [[\"x\"]]}").expect("write");
        let err = run_compare(CompareArgs {
            input: Some(path),
            rounds: 1,
        })
        .expect_err("usage error");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
