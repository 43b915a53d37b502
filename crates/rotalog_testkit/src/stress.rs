//! Stress tests for the rotating sink.
//!
//! Writer threads append fixed-size, self-describing records while a
//! rotator thread keeps rotating. Afterwards the backlog is audited: every
//! record must appear exactly once, intact, and in per-writer order across
//! generations.

use rotalog_core::RotatingFileSink;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Smallest record the encoder can produce (`tttt:ssssssss\n`).
pub const MIN_RECORD_SIZE: usize = 14;

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total write operations performed.
    pub total_ops: usize,
    /// Successful writes.
    pub successful_ops: usize,
    /// Failed writes.
    pub failed_ops: usize,
    /// Rotations that completed.
    pub rotations: usize,
    /// Bytes accepted by successful writes.
    pub bytes_written: u64,
    /// Size of each generation at the moment it was archived, in rotation order.
    pub archived_sizes: Vec<u64>,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total writes: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Rotations: {}", self.rotations);
        println!("Bytes written: {}", self.bytes_written);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent writer threads.
    pub threads: usize,
    /// Records written by each thread.
    pub writes_per_thread: usize,
    /// Rotations performed while the writers run.
    pub rotations: usize,
    /// Size of each record in bytes (at least [`MIN_RECORD_SIZE`]).
    pub record_size: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 4,
            writes_per_thread: 1_000,
            rotations: 16,
            record_size: 64,
        }
    }
}

/// Encodes a record for writer `thread`, sequence `seq`, padded to `size`.
#[must_use]
pub fn encode_record(thread: usize, seq: usize, size: usize) -> Vec<u8> {
    let mut record = format!("{thread:04}:{seq:08}").into_bytes();
    let size = size.max(MIN_RECORD_SIZE);
    record.resize(size - 1, b'.');
    record.push(b'\n');
    record
}

/// Decodes a record line (without its newline) into `(thread, seq)`.
#[must_use]
pub fn decode_record(line: &str) -> Option<(usize, usize)> {
    let head = line.get(..13)?;
    let (thread, seq) = head.split_once(':')?;
    if !line[13..].bytes().all(|b| b == b'.') {
        return None;
    }
    Some((thread.parse().ok()?, seq.parse().ok()?))
}

/// Writers race a rotator on `sink`; returns counts and archived sizes.
///
/// The sink must already be open. Keep `retention >= config.rotations` if
/// the run is going to be audited, or the oldest generations fall off.
pub fn stress_concurrent_rotation(
    sink: Arc<RotatingFileSink>,
    config: &StressConfig,
) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let writers_done = Arc::new(AtomicBool::new(false));

    let start = Instant::now();

    let rotator = {
        let sink = Arc::clone(&sink);
        let writers_done = Arc::clone(&writers_done);
        let rotations = config.rotations;

        thread::spawn(move || {
            let mut archived_sizes = Vec::with_capacity(rotations);
            for _ in 0..rotations {
                // Spread rotations over the writers' run while they last.
                if !writers_done.load(Ordering::Acquire) {
                    thread::sleep(Duration::from_micros(200));
                }
                let result = sink.rotate_with(|archived| {
                    let size = archived
                        .and_then(|path| fs::metadata(path).ok())
                        .map_or(0, |meta| meta.len());
                    archived_sizes.push(size);
                });
                if result.is_err() {
                    break;
                }
            }
            archived_sizes
        })
    };

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let sink = Arc::clone(&sink);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let writes = config.writes_per_thread;
            let record_size = config.record_size;

            thread::spawn(move || {
                for seq in 0..writes {
                    match sink.write(&encode_record(t, seq, record_size)) {
                        Ok(_) => {
                            successful.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(_) => {
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    writers_done.store(true, Ordering::Release);
    let archived_sizes = rotator.join().expect("Rotator panicked");

    let duration = start.elapsed();
    let successful = successful.load(Ordering::Relaxed);
    let failed = failed.load(Ordering::Relaxed);
    let total = successful + failed;
    let ops_per_second = if duration.as_secs_f64() > 0.0 {
        total as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    StressTestResult {
        total_ops: total,
        successful_ops: successful,
        failed_ops: failed,
        rotations: archived_sizes.len(),
        bytes_written: (successful * config.record_size.max(MIN_RECORD_SIZE)) as u64,
        archived_sizes,
        duration,
        ops_per_second,
    }
}

/// Findings of a backlog audit.
#[derive(Debug, Clone, Default)]
pub struct BacklogAudit {
    /// Files read, oldest generation first, current file last.
    pub files: Vec<PathBuf>,
    /// Byte length of each file in `files`.
    pub file_sizes: Vec<u64>,
    /// Well-formed records found.
    pub records: usize,
    /// Lines that did not decode as records.
    pub malformed: usize,
    /// Records seen more than once.
    pub duplicates: usize,
    /// Records that appeared before an earlier record of the same writer.
    pub out_of_order: usize,
}

impl BacklogAudit {
    /// Returns true if nothing was malformed, duplicated or reordered.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.malformed == 0 && self.duplicates == 0 && self.out_of_order == 0
    }

    /// Total bytes across all audited files.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.file_sizes.iter().sum()
    }
}

/// Reads every archive (oldest first) and the current file, checking records.
///
/// # Panics
///
/// Panics if a listed file cannot be read.
pub fn audit_backlog(sink: &RotatingFileSink, threads: usize) -> BacklogAudit {
    let mut audit = BacklogAudit::default();
    let mut next_seq = vec![0usize; threads];
    let mut seen = std::collections::HashSet::new();

    let mut files = sink.archives();
    files.reverse();
    if sink.path().is_file() {
        files.push(sink.path().to_path_buf());
    }

    for file in &files {
        let content = fs::read_to_string(file).expect("Failed to read log file");
        audit.file_sizes.push(content.len() as u64);

        for line in content.lines() {
            let Some((thread, seq)) = decode_record(line).filter(|(t, _)| *t < threads) else {
                audit.malformed += 1;
                continue;
            };
            if !seen.insert((thread, seq)) {
                audit.duplicates += 1;
                continue;
            }
            if seq < next_seq[thread] {
                audit.out_of_order += 1;
            }
            next_seq[thread] = next_seq[thread].max(seq + 1);
            audit.records += 1;
        }
    }

    audit.files = files;
    audit
}
