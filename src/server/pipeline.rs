//! Per-frame processing owned by the send loop
//!
//! classify -> smooth -> state machine -> inject -> build payload. All state
//! lives in this struct, so a fresh pipeline per session (or per test) starts
//! from a clean slate.

use std::sync::Arc;
use std::time::Duration;

use crate::capture::{FrameEncoder, FrameObservation, Resolution};
use crate::config::RelayConfig;
use crate::error::RelayResult;
use crate::gesture::{GestureClassifier, GestureLabel, Landmark};
use crate::input::{InputInjector, PointerAction};
use crate::interaction::InteractionStateMachine;
use crate::processing::{CursorPoint, CursorSmoother};
use crate::protocol::FramePayload;

pub struct FramePipeline<E, I> {
    classifier: GestureClassifier,
    smoother: CursorSmoother,
    interaction: InteractionStateMachine,
    encoder: Arc<E>,
    injector: I,
}

impl<E: FrameEncoder, I: InputInjector> FramePipeline<E, I> {
    pub fn new(config: &RelayConfig, encoder: E, injector: I) -> Self {
        Self {
            classifier: GestureClassifier::new(config.classifier.clone()),
            smoother: CursorSmoother::new(config.cursor_history),
            interaction: InteractionStateMachine::new(&config.interaction),
            encoder: Arc::new(encoder),
            injector,
        }
    }

    pub fn injector(&self) -> &I {
        &self.injector
    }

    pub fn interaction(&self) -> &InteractionStateMachine {
        &self.interaction
    }

    /// Run one observation through the pipeline at monotonic time `now`.
    ///
    /// The image is encoded first on the blocking pool, so an encoding
    /// failure leaves the cursor and interaction state untouched. Frames
    /// without a hand carry the image only and do not tick the state machine.
    pub async fn process(
        &mut self,
        observation: FrameObservation,
        target: Resolution,
        now: Duration,
    ) -> RelayResult<FramePayload> {
        let FrameObservation { hands, image } = observation;

        let encoder = Arc::clone(&self.encoder);
        let image = tokio::task::spawn_blocking(move || encoder.encode(&image, target)).await??;

        let Some(hand) = hands.first() else {
            return Ok(FramePayload {
                image,
                gesture: GestureLabel::None,
                landmarks: Vec::new(),
            });
        };

        let gesture = self.classifier.classify(hand.landmarks());

        let landmarks = hands
            .iter()
            .map(|h| h.to_pixels(target.width, target.height))
            .collect();

        self.move_cursor(hand.wrist());

        for event in self.interaction.tick(gesture, now) {
            tracing::debug!("{:?} ({})", event, gesture);
            self.injector.apply(PointerAction::from(event));
        }

        Ok(FramePayload {
            image,
            gesture,
            landmarks,
        })
    }

    fn move_cursor(&mut self, wrist: Landmark) {
        let screen = self.injector.screen_size();
        let (x, y) = wrist.to_pixels(screen.width, screen.height);
        let smoothed = self.smoother.push(CursorPoint::new(x as f64, y as f64));
        let (sx, sy) = smoothed.to_screen();
        self.injector.pointer_move(sx, sy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedImage;
    use crate::error::RelayError;
    use crate::gesture::classifier::tests::hand_with;
    use crate::gesture::Hand;
    use crate::input::{JournalInjector, MouseButton};
    use parking_lot::Mutex as ParkingMutex;
    use std::thread::ThreadId;

    /// Encodes the target size as text so tests can see which size was used
    struct SizeEchoEncoder;

    impl FrameEncoder for SizeEchoEncoder {
        fn encode(&self, _image: &CapturedImage, target: Resolution) -> RelayResult<Vec<u8>> {
            Ok(target.to_string().into_bytes())
        }
    }

    /// Remembers which thread ran the encode
    #[derive(Default)]
    struct ThreadRecordingEncoder {
        thread: Arc<ParkingMutex<Option<ThreadId>>>,
    }

    impl FrameEncoder for ThreadRecordingEncoder {
        fn encode(&self, _image: &CapturedImage, _target: Resolution) -> RelayResult<Vec<u8>> {
            *self.thread.lock() = Some(std::thread::current().id());
            Ok(Vec::new())
        }
    }

    struct FailingEncoder;

    impl FrameEncoder for FailingEncoder {
        fn encode(&self, _image: &CapturedImage, _target: Resolution) -> RelayResult<Vec<u8>> {
            Err(RelayError::Encoding("boom".to_string()))
        }
    }

    fn observation(hands: Vec<Vec<Landmark>>) -> FrameObservation {
        FrameObservation {
            hands: hands.into_iter().map(|h| Hand::try_from(h).unwrap()).collect(),
            image: CapturedImage {
                data: vec![0xff],
                width: 1280,
                height: 720,
            },
        }
    }

    fn grab_hand() -> Vec<Landmark> {
        hand_with(50.0, 50.0, 50.0, 50.0, 0.0)
    }

    fn left_click_hand() -> Vec<Landmark> {
        hand_with(80.0, 170.0, 170.0, 170.0, 0.2)
    }

    fn pipeline() -> (FramePipeline<SizeEchoEncoder, JournalInjector>, JournalInjector) {
        let journal = JournalInjector::new(Resolution::new(1000, 500));
        let pipeline = FramePipeline::new(&RelayConfig::default(), SizeEchoEncoder, journal.clone());
        (pipeline, journal)
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[tokio::test]
    async fn test_no_hands_sends_image_only() {
        let (mut pipeline, journal) = pipeline();
        let payload = pipeline
            .process(observation(vec![]), Resolution::new(640, 480), ms(0))
            .await
            .unwrap();
        assert_eq!(payload.image, b"640x480".to_vec());
        assert_eq!(payload.gesture, GestureLabel::None);
        assert!(payload.landmarks.is_empty());
        assert!(journal.is_empty());
    }

    #[tokio::test]
    async fn test_landmarks_scaled_to_target() {
        let (mut pipeline, _) = pipeline();
        let payload = pipeline
            .process(observation(vec![grab_hand(), left_click_hand()]), Resolution::new(320, 240), ms(0))
            .await
            .unwrap();
        assert_eq!(payload.landmarks.len(), 2);
        assert!(payload.landmarks.iter().all(|h| h.len() == 21));
        // The wrist of the built hands sits at (0.5, 0.9)
        assert_eq!(payload.landmarks[0][0], (160, 216));
        assert_eq!(payload.image, b"320x240".to_vec());
    }

    #[tokio::test]
    async fn test_only_first_hand_drives_gesture() {
        let (mut pipeline, journal) = pipeline();
        let payload = pipeline
            .process(observation(vec![left_click_hand(), grab_hand()]), Resolution::new(640, 480), ms(0))
            .await
            .unwrap();
        assert_eq!(payload.gesture, GestureLabel::LeftClick);
        assert_eq!(
            journal.button_actions(),
            vec![PointerAction::Click { button: MouseButton::Left }]
        );
    }

    #[tokio::test]
    async fn test_grab_then_release_injects_buttons() {
        let (mut pipeline, journal) = pipeline();
        let target = Resolution::new(640, 480);
        let open = hand_with(170.0, 170.0, 170.0, 170.0, 0.2);

        pipeline.process(observation(vec![grab_hand()]), target, ms(0)).await.unwrap();
        pipeline.process(observation(vec![grab_hand()]), target, ms(100)).await.unwrap();
        assert!(pipeline.interaction().is_grabbing());
        pipeline.process(observation(vec![open.clone()]), target, ms(150)).await.unwrap();
        pipeline.process(observation(vec![open]), target, ms(250)).await.unwrap();

        assert_eq!(
            journal.button_actions(),
            vec![PointerAction::ButtonDown, PointerAction::ButtonUp]
        );
    }

    #[tokio::test]
    async fn test_cursor_follows_smoothed_wrist() {
        let (mut pipeline, journal) = pipeline();
        pipeline
            .process(observation(vec![grab_hand()]), Resolution::new(640, 480), ms(0))
            .await
            .unwrap();
        // Wrist (0.5, 0.9) on a 1000x500 screen
        assert_eq!(journal.actions()[0].action, PointerAction::Move { x: 500, y: 450 });
    }

    #[tokio::test]
    async fn test_encoding_failure_leaves_state_untouched() {
        let journal = JournalInjector::new(Resolution::new(1000, 500));
        let mut pipeline = FramePipeline::new(&RelayConfig::default(), FailingEncoder, journal.clone());
        let result = pipeline
            .process(observation(vec![grab_hand()]), Resolution::new(640, 480), ms(0))
            .await;
        assert!(matches!(result, Err(RelayError::Encoding(_))));
        assert!(journal.is_empty());
        assert!(!pipeline.interaction().is_grabbing());
    }

    #[tokio::test]
    async fn test_encoding_runs_off_the_async_thread() {
        let encoder = ThreadRecordingEncoder::default();
        let seen = encoder.thread.clone();
        let journal = JournalInjector::new(Resolution::new(1000, 500));
        let mut pipeline = FramePipeline::new(&RelayConfig::default(), encoder, journal);

        pipeline
            .process(observation(vec![grab_hand()]), Resolution::new(640, 480), ms(0))
            .await
            .unwrap();

        // The test body runs on a current-thread runtime
        let encode_thread = (*seen.lock()).expect("encoder was not called");
        assert_ne!(encode_thread, std::thread::current().id());
    }
}
