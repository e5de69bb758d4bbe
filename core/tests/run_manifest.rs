use loaf_core::manifest::ParseErrorKind;
use loaf_core::{
    BuildFailure, BuildJob, CommandRunner, Manifest, ManifestError, ParseError, RunConfig,
    RunResult, Scheduler, TargetStatus, Tool,
};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const MANIFEST: &str = "!pull\ngradle A\nmaven B, C\n";

#[derive(Default)]
struct Recorder {
    jobs: Mutex<Vec<(String, Tool, bool)>>,
    log: Mutex<Vec<String>>,
    failing: Vec<String>,
}

#[derive(Clone, Default)]
struct MockRunner(Arc<Recorder>);

impl CommandRunner for MockRunner {
    fn run(&self, job: BuildJob) -> impl Future<Output = RunResult> + Send {
        let recorder = Arc::clone(&self.0);
        async move {
            let name = job.target.path.clone();
            recorder
                .jobs
                .lock()
                .unwrap()
                .push((name.clone(), job.tool, job.pull));
            recorder.log.lock().unwrap().push(format!("start:{}", name));
            tokio::time::sleep(Duration::from_millis(5)).await;
            recorder.log.lock().unwrap().push(format!("end:{}", name));

            if recorder.failing.contains(&name) {
                Err(BuildFailure::new("BUILD FAILURE", ""))
            } else {
                Ok(String::from("BUILD SUCCESS"))
            }
        }
    }
}

fn projects() -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in ["A", "B", "C"] {
        fs::create_dir(tmp.path().join(name)).unwrap();
    }
    tmp
}

fn parse(base: &Path) -> Manifest {
    Manifest::parse(MANIFEST, base).unwrap()
}

async fn run(manifest: &Manifest, runner: MockRunner, skip: usize) -> Vec<(String, TargetStatus)> {
    let config = RunConfig {
        skip,
        pull: manifest.pull(),
        ..RunConfig::default()
    };
    Scheduler::new(runner, config)
        .run(manifest)
        .await
        .into_iter()
        .map(|o| (o.target.path, o.outcome.status()))
        .collect()
}

fn expect(statuses: &[(&str, TargetStatus)]) -> Vec<(String, TargetStatus)> {
    statuses
        .iter()
        .map(|(name, status)| (name.to_string(), *status))
        .collect()
}

#[tokio::test]
async fn all_targets_succeed() {
    let tmp = projects();
    let manifest = parse(tmp.path());
    let runner = MockRunner::default();

    let outcomes = run(&manifest, runner.clone(), 0).await;

    assert_eq!(
        outcomes,
        expect(&[
            ("A", TargetStatus::Succeeded),
            ("B", TargetStatus::Succeeded),
            ("C", TargetStatus::Succeeded),
        ])
    );

    let jobs = runner.0.jobs.lock().unwrap().clone();
    assert_eq!(
        jobs,
        vec![
            ("A".to_string(), Tool::Gradle, true),
            ("B".to_string(), Tool::Maven, true),
            ("C".to_string(), Tool::Maven, true),
        ]
    );

    let log = runner.0.log.lock().unwrap().clone();
    assert_eq!(&log[..4], &["start:A", "end:A", "start:B", "start:C"]);
}

#[tokio::test]
async fn skip_first_target() {
    let tmp = projects();
    let manifest = parse(tmp.path());
    let runner = MockRunner::default();

    let outcomes = run(&manifest, runner.clone(), 1).await;

    assert_eq!(
        outcomes,
        expect(&[
            ("A", TargetStatus::Skipped),
            ("B", TargetStatus::Succeeded),
            ("C", TargetStatus::Succeeded),
        ])
    );
    assert_eq!(runner.0.jobs.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn failing_sibling_does_not_stop_batch() {
    let tmp = projects();
    let manifest = parse(tmp.path());
    let runner = MockRunner(Arc::new(Recorder {
        failing: vec!["B".to_string()],
        ..Recorder::default()
    }));

    let outcomes = run(&manifest, runner, 0).await;

    assert_eq!(
        outcomes,
        expect(&[
            ("A", TargetStatus::Succeeded),
            ("B", TargetStatus::Failed),
            ("C", TargetStatus::Succeeded),
        ])
    );
}

#[tokio::test]
async fn skip_past_end_runs_nothing() {
    let tmp = projects();
    let manifest = parse(tmp.path());
    let runner = MockRunner::default();

    let outcomes = run(&manifest, runner.clone(), manifest.target_count()).await;

    assert!(outcomes.iter().all(|(_, s)| *s == TargetStatus::Skipped));
    assert!(runner.0.jobs.lock().unwrap().is_empty());
}

#[test]
fn invalid_manifest_is_rejected_before_running() {
    let tmp = projects();

    let cases: [(&str, usize, &str); 3] = [
        ("gradle A\n!pull", 2, "rule after rule definitions ended"),
        ("maven A,,B", 1, "missing path"),
        ("gradle A\nmaven B, D", 2, "path does not exist: D"),
    ];

    for (text, line, reason) in cases {
        let err: ParseError = Manifest::parse(text, tmp.path()).unwrap_err();
        assert_eq!(err.line, line);
        assert_eq!(err.kind.to_string(), reason);
    }
}

#[test]
fn load_resolves_paths_against_working_directory() {
    // Test binaries run from the package directory, which has no such sibling.
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("loaf-sibling-project")).unwrap();
    let manifest_path = tmp.path().join("build.loaf");
    fs::write(&manifest_path, "maven loaf-sibling-project\n").unwrap();

    let text = fs::read_to_string(&manifest_path).unwrap();
    let manifest = Manifest::parse(&text, tmp.path()).unwrap();
    assert_eq!(
        manifest.steps[0].targets[0].dir,
        tmp.path().join("loaf-sibling-project")
    );

    match Manifest::load(&manifest_path) {
        Err(ManifestError::Parse(err)) => {
            assert_eq!(err.line, 1);
            assert_eq!(
                err.kind,
                ParseErrorKind::PathDoesNotExist("loaf-sibling-project".to_string())
            );
        }
        other => panic!("expected an unresolved sibling path, got {:?}", other.map(|_| ())),
    }
}
