use synergist::data::{Category, ChampionId, Mode};
use synergist::host::{
    BuildRequest, HostError, HostMessage, ProgressSink, SearchHost, PROGRESS_MESSAGE_COUNT,
};
use synergist::optimizer::{
    combination, Candidate, DuplicateWeights, RangeConstraint, SearchConfig, SearchResult,
    Stopped, SynergyBonus, WeightConfig,
};

fn request(pool_size: usize, team_size: usize) -> BuildRequest {
    let candidates = (0..pool_size)
        .map(|i| {
            let mut candidate = Candidate::new(
                ChampionId::new(format!("hero{i}"), 4),
                Category::ALL[i % Category::COUNT],
                1_000.0 + i as f64,
            );
            if i + 1 < pool_size {
                candidate = candidate.with_synergy(format!("hero{}", i + 1), SynergyBonus::plain(1.0));
            }
            candidate
        })
        .collect();
    BuildRequest {
        mode: Mode::Arena,
        candidates,
        config: SearchConfig {
            team_size,
            weights: WeightConfig::default().with_duplicates(DuplicateWeights::uniform(1.0)),
            range: RangeConstraint::unbounded(),
        },
    }
}

#[tokio::test]
async fn build_reports_progress_then_result() {
    let mut host = SearchHost::new();
    let mut handle = host.build(request(12, 3)).expect("runtime is available");
    let total = combination(12, 3);

    let mut last = 0;
    let mut progress_messages = 0;
    let outcome = loop {
        match handle.next().await.expect("build should finish") {
            HostMessage::Progress { current, max } => {
                assert_eq!(max, total);
                assert!(current > last);
                last = current;
                progress_messages += 1;
            }
            HostMessage::Result(outcome) => break outcome,
            HostMessage::Failed(err) => panic!("build failed: {err}"),
        }
    };

    assert_eq!(last, total);
    assert!(progress_messages as u64 <= PROGRESS_MESSAGE_COUNT + 1);
    assert_eq!(outcome.teams.len(), 1);
    assert_eq!(outcome.teams[0].len(), 3);
    assert!(outcome.value > 0.0);
    assert!(handle.next().await.is_none());
}

#[tokio::test]
async fn empty_pool_yields_empty_outcome_without_progress() {
    let mut host = SearchHost::new();
    let handle = host.build(request(2, 3)).expect("runtime is available");
    let mut ticks = 0;
    let outcome = handle
        .wait(|_, _| ticks += 1)
        .await
        .expect("build should finish")
        .expect("build was not superseded");
    assert!(outcome.teams.is_empty());
    assert_eq!(outcome.value, 0.0);
    assert_eq!(ticks, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn newer_build_supersedes_older_one() {
    let mut host = SearchHost::new();
    let mut first = host.build(request(40, 5)).expect("runtime is available");
    let second = host.build(request(8, 2)).expect("runtime is available");

    assert_eq!(first.generation(), 1);
    assert_eq!(second.generation(), 2);
    assert_eq!(host.current_generation(), 2);
    assert!(first.is_cancelled());
    assert!(first.next().await.is_none());

    let mut maxima = Vec::new();
    let outcome = second
        .wait(|_, max| maxima.push(max))
        .await
        .expect("second build should finish")
        .expect("second build is current");
    assert!(maxima.iter().all(|&max| max == combination(8, 2)));
    assert_eq!(outcome.teams[0].len(), 2);
}

#[tokio::test]
async fn superseded_handle_waits_to_none() {
    let mut host = SearchHost::new();
    let first = host.build(request(30, 4)).expect("runtime is available");
    let _second = host.build(request(6, 2)).expect("runtime is available");
    assert_eq!(first.wait(|_, _| {}).await, Ok(None));
}

#[test]
fn building_outside_a_runtime_fails() {
    let mut host = SearchHost::new();
    let err = host.build(request(4, 2)).err().expect("no runtime is running");
    assert_eq!(err, HostError::NoRuntime);
    assert_eq!(host.current_generation(), 0);
}

fn crashing_search(
    _candidates: &[Candidate],
    _config: &SearchConfig,
    on_progress: ProgressSink<'_>,
) -> Result<SearchResult, Stopped> {
    let _ = on_progress(1, 2);
    panic!("search crashed");
}

#[tokio::test]
async fn crashed_worker_is_reported_as_failure() {
    let mut host = SearchHost::with_search(crashing_search);
    let handle = host.build(request(6, 2)).expect("runtime is available");
    let err = handle
        .wait(|_, _| {})
        .await
        .expect_err("a crashed worker has no result");
    assert_eq!(err, HostError::WorkerPanicked("search crashed".to_string()));
}
