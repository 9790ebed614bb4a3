//! Sequential batch runs over the working set.
//!
//! Files are processed one at a time in the order given. Each file goes
//! through the transformer and then the eraser, and its outcome is recorded
//! on the [`ManagedFile`] before the next one starts. A failure never stops
//! the batch; cancellation does, at the next checkpoint.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::cancel::Cancellation;
use crate::config::{MIN_DISPLAY_DURATION, TEMP_SUFFIX};
use crate::eraser;
use crate::error::ErrorKind;
use crate::file::ManagedFile;
use crate::secret::Password;
use crate::transform::Transformer;
use crate::types::{Direction, TransformOutcome};

/// One progress event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Zero-based position of the file the event is about. Equals `total` on
    /// the final event.
    pub index: usize,
    pub total: usize,
    /// Files finished so far.
    pub completed: usize,
    pub message: String,
}

impl Progress {
    /// Completed share of the batch in `0.0..=1.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Receiver of progress events. Events arrive in order from a single
/// producer.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: Progress);
}

impl<F> ProgressSink for F
where
    F: Fn(Progress) + Send + Sync,
{
    #[inline]
    fn report(&self, progress: Progress) {
        self(progress)
    }
}

/// A file and the outcome of this run for it.
#[derive(Clone, Debug)]
pub struct ReportEntry {
    pub file: ManagedFile,
    pub outcome: TransformOutcome,
}

/// Summary of a batch run.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    entries: Vec<ReportEntry>,
    failures: Vec<String>,
    warnings: Vec<String>,
    cancelled: bool,
}

impl BatchReport {
    /// One entry per input file, in input order. Files skipped by
    /// cancellation carry a cancellation outcome.
    #[inline]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// `"<name>: <kind> - <detail>"` for every failed file.
    #[inline]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Problems that did not make a file fail, or that happened after its
    /// outcome was settled.
    #[inline]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[inline]
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_cancelled()).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    fn push_failure(&mut self, file: &ManagedFile, outcome: &TransformOutcome) {
        self.failures.push(format!("{}: {} - {}", file.name(), outcome.error(), outcome.detail()));
    }
}

/// Drives the transformer and eraser over a list of files.
#[derive(Clone, Debug)]
pub struct Orchestrator {
    transformer: Transformer,
    min_display: Duration,
}

impl Orchestrator {
    pub fn new(transformer: Transformer) -> Self {
        Self { transformer, min_display: MIN_DISPLAY_DURATION }
    }

    /// Overrides the minimum run duration. `Duration::ZERO` disables padding.
    pub fn with_min_display(mut self, min_display: Duration) -> Self {
        self.min_display = min_display;
        self
    }

    /// Processes `files` in order.
    ///
    /// The exclusive borrow is the caller's guarantee that nothing else edits
    /// the list while the run is in flight. Successful files have their
    /// metadata refreshed. Files never reached because of cancellation keep
    /// their previous `last_result`.
    pub async fn run<C, P>(&self, files: &mut [ManagedFile], password: &Password, direction: Direction, cancel: &C, progress: &P) -> BatchReport
    where
        C: Cancellation + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let started = Instant::now();
        let total = files.len();
        let mut report = BatchReport::default();

        info!(total, direction = %direction, "batch started");

        let mut stopped_at = None;
        for (index, file) in files.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                stopped_at = Some(index);
                break;
            }

            let outcome = self.process_one(file, index, total, password, direction, cancel, progress, &mut report).await;

            if outcome.is_failure() {
                report.push_failure(file, &outcome);
            } else if outcome.is_cancelled() {
                report.cancelled = true;
            }

            file.record(outcome.clone());
            progress.report(Progress { index, total, completed: index + 1, message: format!("{}: {}", file.name(), file.status()) });
            report.entries.push(ReportEntry { file: file.clone(), outcome });
        }

        if let Some(index) = stopped_at {
            info!(remaining = total - index, "batch cancelled");
            report.cancelled = true;
            report.entries.extend(files[index..].iter().map(|file| ReportEntry { file: file.clone(), outcome: TransformOutcome::cancelled() }));
        }

        progress.report(Progress { index: total, total, completed: total, message: if report.cancelled { "Cancelled".to_owned() } else { "Finished".to_owned() } });

        info!(succeeded = report.succeeded(), failed = report.failed(), skipped = report.skipped(), "batch finished");

        let elapsed = started.elapsed();
        if elapsed < self.min_display {
            sleep(self.min_display - elapsed).await;
        }

        report
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_one<C, P>(&self, file: &mut ManagedFile, index: usize, total: usize, password: &Password, direction: Direction, cancel: &C, progress: &P, report: &mut BatchReport) -> TransformOutcome
    where
        C: Cancellation + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let temp = file.temp_path();
        let temp_name = format!("{}{TEMP_SUFFIX}", file.name());

        progress.report(Progress { index, total, completed: index, message: format!("{} {temp_name}", direction.progress_verb()) });

        let transformed = self.transformer.process(file.path(), &temp, password, direction, cancel).await;
        let outcome = transformed.outcome;

        progress.report(Progress { index, total, completed: index, message: format!("Secure deleting temporary file {temp_name}") });

        // A failed transform that never created the temp path leaves whatever
        // sits there alone.
        let finalized = if outcome.is_success() || transformed.output_created { eraser::finalize(file.path(), &temp, outcome.is_success()).await } else { Ok(()) };

        let outcome = match finalized {
            Ok(()) => outcome,
            Err(err) => {
                warn!(path = %file.path().display(), "{err}");
                report.warnings.push(format!("{}: {err}", file.name()));
                if outcome.is_success() { TransformOutcome::failed(ErrorKind::FileAccessError, err.to_string()) } else { outcome }
            }
        };

        if outcome.is_success() {
            if let Err(e) = file.refresh().await {
                warn!(path = %file.path().display(), "failed to refresh metadata: {e}");
                report.warnings.push(format!("{}: failed to refresh metadata: {e}", file.name()));
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::cancel::{CancelFlag, Never};
    use crate::cipher::{Cipher, derive_key};
    use crate::file::FileSet;
    use crate::transform::MemoryBudget;
    use crate::types::FileStatus;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Progress>>,
    }

    impl ProgressSink for Recorder {
        fn report(&self, progress: Progress) {
            self.events.lock().unwrap().push(progress);
        }
    }

    impl Recorder {
        fn messages(&self) -> Vec<String> {
            self.events.lock().unwrap().iter().map(|p| p.message.clone()).collect()
        }
    }

    /// Cancels once the given message has been reported.
    struct CancelAfter<'a> {
        flag: &'a CancelFlag,
        trigger: &'static str,
    }

    impl ProgressSink for CancelAfter<'_> {
        fn report(&self, progress: Progress) {
            if progress.message.starts_with(self.trigger) {
                self.flag.cancel();
            }
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Transformer::default()).with_min_display(Duration::ZERO)
    }

    async fn working_set(contents: &[(&str, &[u8])]) -> (TempDir, FileSet) {
        let dir = tempdir().unwrap();
        for (name, data) in contents {
            std::fs::write(dir.path().join(name), data).unwrap();
        }
        let mut set = FileSet::new();
        set.add(contents.iter().map(|(name, _)| dir.path().join(name))).await;
        (dir, set)
    }

    #[tokio::test]
    async fn test_encrypt_then_decrypt_three_files() {
        let contents: [(&str, &[u8]); 3] = [("a.txt", b"alpha"), ("b.txt", b"sixteen bytes!!!"), ("c.txt", b"")];
        let (dir, mut set) = working_set(&contents).await;
        let password = Password::new("correct horse");

        let report = orchestrator().run(set.files_mut(), &password, Direction::Encrypt, &Never, &|_: Progress| {}).await;
        assert_eq!(report.succeeded(), 3);
        assert!(report.is_clean());

        for (name, data) in contents {
            let on_disk = std::fs::read(dir.path().join(name)).unwrap();
            assert_ne!(on_disk, data);
            assert_eq!(on_disk.len(), (data.len() / 16 + 1) * 16);
            assert!(!dir.path().join(format!("{name}.aegis")).exists());
        }
        assert!(set.iter().all(|f| f.status() == FileStatus::Succeeded));
        assert_eq!(set.files()[1].size(), 32);

        let report = orchestrator().run(set.files_mut(), &password, Direction::Decrypt, &Never, &|_: Progress| {}).await;
        assert_eq!(report.succeeded(), 3);
        for (name, data) in contents {
            assert_eq!(std::fs::read(dir.path().join(name)).unwrap(), data);
        }
        assert_eq!(set.files()[1].size(), 16);
    }

    #[tokio::test]
    async fn test_wrong_password_keeps_ciphertext() {
        let (dir, mut set) = working_set(&[("a.txt", b"a reasonably long secret message here")]).await;

        orchestrator().run(set.files_mut(), &Password::new("right"), Direction::Encrypt, &Never, &|_: Progress| {}).await;
        let ciphertext = std::fs::read(dir.path().join("a.txt")).unwrap();

        let report = orchestrator().run(set.files_mut(), &Password::new("wrong"), Direction::Decrypt, &Never, &|_: Progress| {}).await;

        // PKCS#7 can accept a wrong key by chance; the usual case is a failure.
        if report.failed() == 1 {
            assert_eq!(set.files()[0].status(), FileStatus::Failed(ErrorKind::DecryptionError));
            assert!(report.failures()[0].starts_with("a.txt: Decryption error - "));
            assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), ciphertext);
            assert!(!dir.path().join("a.txt.aegis").exists());
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_batch() {
        let (dir, mut set) = working_set(&[("plain.txt", b"not ciphertext"), ("other.txt", b"x")]).await;

        orchestrator().run(&mut set.files_mut()[1..], &Password::new("pw"), Direction::Encrypt, &Never, &|_: Progress| {}).await;

        let report = orchestrator().run(set.files_mut(), &Password::new("pw"), Direction::Decrypt, &Never, &|_: Progress| {}).await;
        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(std::fs::read(dir.path().join("plain.txt")).unwrap(), b"not ciphertext");
        assert_eq!(std::fs::read(dir.path().join("other.txt")).unwrap(), b"x");
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let (dir, mut set) = working_set(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
        let flag = CancelFlag::new();
        flag.cancel();

        let recorder = Recorder::default();
        let report = orchestrator().run(set.files_mut(), &Password::new("pw"), Direction::Encrypt, &flag, &recorder).await;

        assert!(report.was_cancelled());
        assert_eq!(report.skipped(), 2);
        assert!(report.failures().is_empty());
        assert!(set.iter().all(|f| f.last_result().is_none()));
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"a");
        assert_eq!(recorder.messages(), ["Cancelled"]);
    }

    #[tokio::test]
    async fn test_cancel_mid_batch_keeps_finished_results() {
        let (dir, mut set) = working_set(&[("a.txt", b"a"), ("b.txt", b"b"), ("c.txt", b"c")]).await;
        let flag = CancelFlag::new();
        let sink = CancelAfter { flag: &flag, trigger: "a.txt: " };

        let report = orchestrator().run(set.files_mut(), &Password::new("pw"), Direction::Encrypt, &flag, &sink).await;

        assert!(report.was_cancelled());
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(set.files()[0].status(), FileStatus::Succeeded);
        assert!(set.files()[1].last_result().is_none());
        assert_eq!(std::fs::read(dir.path().join("b.txt")).unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_cancel_during_file_discards_output() {
        let (dir, mut set) = working_set(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
        let flag = CancelFlag::new();
        let sink = CancelAfter { flag: &flag, trigger: "Encrypting a.txt" };

        let report = orchestrator().run(set.files_mut(), &Password::new("pw"), Direction::Encrypt, &flag, &sink).await;

        assert!(report.was_cancelled());
        assert_eq!(report.succeeded(), 0);
        assert!(set.files()[0].last_result().is_some_and(TransformOutcome::is_cancelled));
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"a");
        assert!(!dir.path().join("a.txt.aegis").exists());
    }

    #[tokio::test]
    async fn test_progress_is_ordered() {
        let (_dir, mut set) = working_set(&[("a.txt", b"a"), ("b.txt", b"b")]).await;
        let recorder = Recorder::default();

        orchestrator().run(set.files_mut(), &Password::new("pw"), Direction::Encrypt, &Never, &recorder).await;

        assert_eq!(
            recorder.messages(),
            [
                "Encrypting a.txt.aegis",
                "Secure deleting temporary file a.txt.aegis",
                "a.txt: done",
                "Encrypting b.txt.aegis",
                "Secure deleting temporary file b.txt.aegis",
                "b.txt: done",
                "Finished",
            ]
        );

        let events = recorder.events.lock().unwrap();
        let fractions: Vec<f64> = events.iter().map(Progress::fraction).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(fractions.last().copied(), Some(1.0));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let recorder = Recorder::default();
        let report = orchestrator().run(&mut [], &Password::new("pw"), Direction::Encrypt, &Never, &recorder).await;
        assert!(report.entries().is_empty());
        assert!(report.is_clean());
        assert_eq!(recorder.events.lock().unwrap()[0].fraction(), 1.0);
    }

    #[tokio::test]
    async fn test_too_large_is_reported() {
        let (_dir, mut set) = working_set(&[("big.bin", &[7u8; 4096])]).await;
        let orchestrator = Orchestrator::new(Transformer::new(MemoryBudget::new(2048, 1024))).with_min_display(Duration::ZERO);

        let report = orchestrator.run(set.files_mut(), &Password::new("pw"), Direction::Encrypt, &Never, &|_: Progress| {}).await;
        assert_eq!(set.files()[0].status(), FileStatus::Failed(ErrorKind::FileTooLarge));
        assert!(report.failures()[0].starts_with("big.bin: File too large - "));
    }

    #[tokio::test]
    async fn test_min_display_padding() {
        let orchestrator = Orchestrator::new(Transformer::default()).with_min_display(Duration::from_millis(500));
        let started = Instant::now();
        orchestrator.run(&mut [], &Password::new("pw"), Direction::Encrypt, &Never, &|_: Progress| {}).await;
        assert!(started.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_existing_aegis_sibling_survives_failures() {
        let (dir, mut set) = working_set(&[("a.txt", &[7u8; 4095])]).await;
        let sibling = dir.path().join("a.txt.aegis");
        std::fs::write(&sibling, b"someone else's file").unwrap();
        let password = Password::new("pw");

        let small = Orchestrator::new(Transformer::new(MemoryBudget::new(2048, 1024))).with_min_display(Duration::ZERO);
        small.run(set.files_mut(), &password, Direction::Encrypt, &Never, &|_: Progress| {}).await;
        assert_eq!(set.files()[0].status(), FileStatus::Failed(ErrorKind::FileTooLarge));
        assert_eq!(std::fs::read(&sibling).unwrap(), b"someone else's file");

        orchestrator().run(set.files_mut(), &password, Direction::Decrypt, &Never, &|_: Progress| {}).await;
        assert_eq!(set.files()[0].status(), FileStatus::Failed(ErrorKind::DecryptionError));
        assert_eq!(std::fs::read(&sibling).unwrap(), b"someone else's file");

        let flag = CancelFlag::new();
        let sink = CancelAfter { flag: &flag, trigger: "Encrypting a.txt" };
        orchestrator().run(set.files_mut(), &password, Direction::Encrypt, &flag, &sink).await;
        assert_eq!(set.files()[0].status(), FileStatus::Cancelled);
        assert_eq!(std::fs::read(&sibling).unwrap(), b"someone else's file");

        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), vec![7u8; 4095]);
    }

    #[tokio::test]
    async fn test_existing_aegis_sibling_blocks_transform() {
        let (dir, mut set) = working_set(&[("a.txt", b"plain")]).await;
        let sibling = dir.path().join("a.txt.aegis");
        std::fs::write(&sibling, b"kept from an earlier run").unwrap();

        let report = orchestrator().run(set.files_mut(), &Password::new("pw"), Direction::Encrypt, &Never, &|_: Progress| {}).await;

        assert_eq!(set.files()[0].status(), FileStatus::Failed(ErrorKind::FileAccessError));
        assert!(report.failures()[0].contains("already exists"));
        assert!(report.warnings().is_empty());
        assert_eq!(std::fs::read(dir.path().join("a.txt")).unwrap(), b"plain");
        assert_eq!(std::fs::read(&sibling).unwrap(), b"kept from an earlier run");
    }

    /// Swaps the original for a non-empty directory just before promotion,
    /// so deleting it fails.
    struct BlockDelete {
        original: PathBuf,
    }

    impl ProgressSink for BlockDelete {
        fn report(&self, progress: Progress) {
            if progress.message.starts_with("Secure deleting") {
                std::fs::remove_file(&self.original).unwrap();
                std::fs::create_dir(&self.original).unwrap();
                std::fs::write(self.original.join("inner"), b"x").unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_failed_promotion_keeps_replacement() {
        let (_dir, mut set) = working_set(&[("doc.txt", b"the new content survives")]).await;
        let original = set.files()[0].path().to_path_buf();
        let temp = set.files()[0].temp_path();
        let password = Password::new("pw");

        let report = orchestrator().run(set.files_mut(), &password, Direction::Encrypt, &Never, &BlockDelete { original }).await;

        assert_eq!(set.files()[0].status(), FileStatus::Failed(ErrorKind::FileAccessError));
        assert_eq!(report.failed(), 1);
        assert_eq!(report.warnings().len(), 1);
        assert!(report.warnings()[0].starts_with("doc.txt: failed to remove original"));
        assert!(report.failures()[0].contains("new content kept at"));

        let kept = std::fs::read(&temp).unwrap();
        let cipher = Cipher::new(derive_key(&password)).unwrap();
        assert_eq!(cipher.decrypt(&kept).unwrap(), b"the new content survives");
    }
}
