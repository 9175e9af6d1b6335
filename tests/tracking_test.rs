use linecount_rs::{Detection, SortTracker, Track, TrackerConfig};

fn car(x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
    Detection::new(x1, y1, x2, y2, 0.9, "car")
}

fn ids(tracks: &[Track]) -> Vec<u64> {
    tracks.iter().map(|t| t.id).collect()
}

#[test]
fn test_basic_tracking() {
    let mut tracker = SortTracker::new(TrackerConfig::default());

    // Frame 1: one detection, reported immediately during warm-up
    let tracks1 = tracker.update(&[car(100.0, 100.0, 200.0, 200.0)]);
    assert_eq!(tracks1.len(), 1);
    let id1 = tracks1[0].id;

    // Frames 2-6: object drifts; ID must persist
    for step in 1..=5 {
        let offset = 5.0 * step as f32;
        let tracks = tracker.update(&[car(
            100.0 + offset,
            100.0 + offset,
            200.0 + offset,
            200.0 + offset,
        )]);
        assert_eq!(ids(&tracks), vec![id1], "step {step}");
    }

    // Frame 7: object missed; nothing reported but the track is kept
    assert!(tracker.update(&[]).is_empty());
    assert_eq!(tracker.num_tracks(), 1);

    // Frames 8-10: object back; same ID once the streak is rebuilt
    let mut last = Vec::new();
    for step in 7..=9 {
        let offset = 5.0 * step as f32;
        last.push(tracker.update(&[car(
            100.0 + offset,
            100.0 + offset,
            200.0 + offset,
            200.0 + offset,
        )]));
    }
    assert_eq!(ids(&last[2]), vec![id1]);
}

#[test]
fn test_new_object_is_debounced_after_warm_up() {
    let mut tracker = SortTracker::new(TrackerConfig {
        min_hits: 3,
        ..TrackerConfig::default()
    });
    for _ in 0..3 {
        assert!(tracker.update(&[]).is_empty());
    }

    let det = car(300.0, 300.0, 380.0, 360.0);
    // Seeded, then matched once and twice: still a candidate
    for _ in 0..3 {
        assert!(tracker.update(&[det.clone()]).is_empty());
    }
    // Third consecutive match after seeding
    let tracks = tracker.update(&[det.clone()]);
    assert_eq!(ids(&tracks), vec![1]);
}

#[test]
fn test_single_frame_blip_never_reported() {
    let mut tracker = SortTracker::default();
    for _ in 0..3 {
        tracker.update(&[]);
    }
    assert!(tracker.update(&[car(10.0, 10.0, 60.0, 60.0)]).is_empty());
    for _ in 0..25 {
        assert!(tracker.update(&[]).is_empty());
    }
    assert_eq!(tracker.num_tracks(), 0);
}

#[test]
fn test_track_retired_after_max_age_gets_new_id() {
    let max_age = 3;
    let mut tracker = SortTracker::new(TrackerConfig {
        max_age,
        min_hits: 3,
        iou_threshold: 0.3,
    });
    let det = car(500.0, 500.0, 600.0, 560.0);

    let mut tracks = tracker.update(&[det.clone()]);
    for _ in 0..3 {
        tracks = tracker.update(&[det.clone()]);
    }
    assert_eq!(ids(&tracks), vec![1]);

    // Unmatched for max_age + 1 frames
    for _ in 0..=max_age {
        assert!(tracker.update(&[]).is_empty());
    }
    assert_eq!(tracker.num_tracks(), 0);

    // Same place again: a brand new identity
    for _ in 0..4 {
        tracks = tracker.update(&[det.clone()]);
    }
    assert_eq!(ids(&tracks), vec![2]);
}

#[test]
fn test_track_within_max_age_keeps_id() {
    let max_age = 3;
    let mut tracker = SortTracker::new(TrackerConfig {
        max_age,
        ..TrackerConfig::default()
    });
    let det = car(500.0, 500.0, 600.0, 560.0);

    for _ in 0..4 {
        tracker.update(&[det.clone()]);
    }
    for _ in 0..max_age {
        tracker.update(&[]);
    }
    assert_eq!(tracker.num_tracks(), 1);

    let mut tracks = tracker.update(&[det.clone()]);
    for _ in 0..2 {
        tracks = tracker.update(&[det.clone()]);
    }
    assert_eq!(ids(&tracks), vec![1]);
}

#[test]
fn test_identical_sequences_give_identical_tracks() {
    let frames: Vec<Vec<Detection>> = (0..30)
        .map(|i| {
            let x = 20.0 * i as f32;
            let mut dets = vec![car(x, 100.0, x + 120.0, 180.0)];
            if i % 4 != 0 {
                dets.push(car(900.0 - x, 400.0, 1000.0 - x, 470.0));
            }
            if i == 12 {
                dets.push(car(40.0, 40.0, 60.0, 60.0));
            }
            dets
        })
        .collect();

    let mut a = SortTracker::default();
    let mut b = SortTracker::default();
    for dets in &frames {
        assert_eq!(a.update(dets), b.update(dets));
    }
}

#[test]
fn test_two_objects_keep_distinct_ids() {
    let mut tracker = SortTracker::default();
    let mut got = Vec::new();
    for i in 0..8 {
        let x = 10.0 * i as f32;
        got = ids(&tracker.update(&[
            car(x, 0.0, x + 100.0, 80.0),
            car(600.0 - x, 300.0, 700.0 - x, 380.0),
        ]));
    }
    got.sort();
    assert_eq!(got, vec![1, 2]);
}
