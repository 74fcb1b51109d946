use embedded_hal_async::delay::DelayNs;

use super::{classify, AccelerationSample, ClassificationConfig, Orientation};

/// Supplies the latest acceleration reading.
///
/// Reads never fail and never block for long: when the sensor has nothing new
/// the previous sample is returned again.
pub trait SampleSource {
    async fn read(&mut self) -> AccelerationSample;
}

/// Runs one debounce window starting from `previous`.
///
/// A candidate is taken from the first sample, then `stable_sample_count`
/// further samples must classify to the same candidate, one every
/// `sampling_interval_ms`. The first disagreeing sample ends the window early
/// and `previous` is returned. Every sample is classified against `previous`,
/// so an ambiguous sample counts as a vote for no change.
pub async fn resolve_orientation(
    previous: Orientation,
    config: &ClassificationConfig,
    source: &mut impl SampleSource,
    delay: &mut impl DelayNs,
) -> Orientation {
    let candidate = classify(&source.read().await, previous, config);
    delay.delay_ms(config.sampling_interval_ms).await;

    for _ in 0..config.stable_sample_count {
        if classify(&source.read().await, previous, config) != candidate {
            return previous;
        }
        delay.delay_ms(config.sampling_interval_ms).await;
    }

    candidate
}

/// Owns the confirmed orientation and the config it is classified with.
pub struct OrientationTracker {
    current: Orientation,
    config: ClassificationConfig,
}

impl OrientationTracker {
    pub fn new(config: ClassificationConfig) -> Self {
        Self {
            current: Orientation::Start,
            config,
        }
    }

    pub fn current(&self) -> Orientation {
        self.current
    }

    pub fn config(&self) -> &ClassificationConfig {
        &self.config
    }

    /// Runs a debounce window without committing its result.
    pub async fn resolve(
        &self,
        source: &mut impl SampleSource,
        delay: &mut impl DelayNs,
    ) -> Orientation {
        resolve_orientation(self.current, &self.config, source, delay).await
    }

    /// Runs a debounce window and commits its result.
    ///
    /// Returns the new orientation if it differs from the previous one.
    pub async fn update(
        &mut self,
        source: &mut impl SampleSource,
        delay: &mut impl DelayNs,
    ) -> Option<Orientation> {
        let resolved = self.resolve(source, delay).await;
        if resolved == self.current {
            return None;
        }

        log_debug!("orientation {} -> {}", self.current, resolved);
        self.current = resolved;
        Some(resolved)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{sample_for, ScriptedSource, VirtualTime};

    fn config(stable_sample_count: u32) -> ClassificationConfig {
        ClassificationConfig::new(20, stable_sample_count, 0.9, 0.9, 0.75)
    }

    async fn resolve_sequence(
        previous: Orientation,
        stable_sample_count: u32,
        sequence: &[Orientation],
    ) -> (Orientation, ScriptedSource, VirtualTime) {
        let mut source = ScriptedSource::from_orientations(sequence);
        let mut time = VirtualTime::new();
        let resolved =
            resolve_orientation(previous, &config(stable_sample_count), &mut source, &mut time)
                .await;
        (resolved, source, time)
    }

    #[tokio::test]
    async fn unanimous_window_is_accepted() {
        let (resolved, source, time) = resolve_sequence(
            Orientation::Flat,
            2,
            &[
                Orientation::PositiveX,
                Orientation::PositiveX,
                Orientation::PositiveX,
            ],
        )
        .await;
        assert_eq!(resolved, Orientation::PositiveX);
        assert_eq!(source.reads, 3);
        assert_eq!(time.delays(), vec![20, 20, 20]);
    }

    #[tokio::test]
    async fn disagreement_aborts_the_window() {
        let (resolved, source, time) = resolve_sequence(
            Orientation::Flat,
            2,
            &[
                Orientation::PositiveX,
                Orientation::PositiveX,
                Orientation::PositiveY,
            ],
        )
        .await;
        assert_eq!(resolved, Orientation::Flat);
        assert_eq!(source.reads, 3);
        assert_eq!(time.delays(), vec![20, 20]);
    }

    #[tokio::test]
    async fn abort_happens_on_first_disagreement() {
        let (resolved, source, time) = resolve_sequence(
            Orientation::NegativeY,
            5,
            &[
                Orientation::Flat,
                Orientation::PositiveX,
                Orientation::Flat,
                Orientation::Flat,
            ],
        )
        .await;
        assert_eq!(resolved, Orientation::NegativeY);
        assert_eq!(source.reads, 2);
        assert_eq!(time.delays(), vec![20]);
    }

    #[tokio::test]
    async fn ambiguous_sample_votes_for_previous() {
        // Start stands for a sample with no dominant axis
        let (resolved, _, _) = resolve_sequence(
            Orientation::Flat,
            2,
            &[
                Orientation::PositiveX,
                Orientation::Start,
                Orientation::PositiveX,
            ],
        )
        .await;
        assert_eq!(resolved, Orientation::Flat);
    }

    #[tokio::test]
    async fn zero_stable_samples_accepts_first_candidate() {
        let (resolved, source, time) = resolve_sequence(
            Orientation::Flat,
            0,
            &[Orientation::NegativeX, Orientation::PositiveY],
        )
        .await;
        assert_eq!(resolved, Orientation::NegativeX);
        assert_eq!(source.reads, 1);
        assert_eq!(time.delays(), vec![20]);
    }

    #[tokio::test]
    async fn same_candidate_runs_full_window() {
        let (resolved, source, time) = resolve_sequence(
            Orientation::PositiveY,
            3,
            &[Orientation::PositiveY; 4],
        )
        .await;
        assert_eq!(resolved, Orientation::PositiveY);
        assert_eq!(source.reads, 4);
        assert_eq!(time.delays().len(), 4);
    }

    #[tokio::test]
    async fn tracker_reports_changes_only() {
        let mut tracker = OrientationTracker::new(config(2));
        let mut time = VirtualTime::new();
        assert_eq!(tracker.current(), Orientation::Start);

        let mut source = ScriptedSource::new([sample_for(Orientation::Flat); 3]);
        assert_eq!(
            tracker.update(&mut source, &mut time).await,
            Some(Orientation::Flat)
        );
        assert_eq!(tracker.current(), Orientation::Flat);

        let mut source = ScriptedSource::new([sample_for(Orientation::Flat); 3]);
        assert_eq!(tracker.update(&mut source, &mut time).await, None);

        // a transient tilt doesn't make it through the window
        let mut source = ScriptedSource::from_orientations(&[
            Orientation::PositiveX,
            Orientation::Flat,
            Orientation::PositiveX,
        ]);
        assert_eq!(tracker.update(&mut source, &mut time).await, None);
        assert_eq!(tracker.current(), Orientation::Flat);

        let mut source = ScriptedSource::new([sample_for(Orientation::NegativeX); 3]);
        assert_eq!(
            tracker.update(&mut source, &mut time).await,
            Some(Orientation::NegativeX)
        );
    }

    #[tokio::test]
    async fn tracker_stays_at_start_without_dominant_axis() {
        let mut tracker = OrientationTracker::new(config(1));
        let mut time = VirtualTime::new();
        let mut source = ScriptedSource::new([AccelerationSample::new(0.3, 0.3, 0.3); 2]);
        assert_eq!(tracker.update(&mut source, &mut time).await, None);
        assert_eq!(tracker.current(), Orientation::Start);
    }

    #[tokio::test]
    async fn resolve_does_not_commit() {
        let tracker = OrientationTracker::new(config(0));
        let mut time = VirtualTime::new();
        let mut source = ScriptedSource::new([sample_for(Orientation::PositiveY)]);
        assert_eq!(
            tracker.resolve(&mut source, &mut time).await,
            Orientation::PositiveY
        );
        assert_eq!(tracker.current(), Orientation::Start);
    }
}
