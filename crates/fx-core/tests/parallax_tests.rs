use glam::Vec2;
use portal_fx_core::profile::{route_matches, should_mount_background, should_mount_cursor};
use portal_fx_core::{
    neutral_transform, DeviceProfile, DeviceSignals, FxConfig, ParallaxConfig, ParallaxTracker,
    Rect,
};

const CARD: Rect = Rect {
    left: 40.0,
    top: 80.0,
    width: 320.0,
    height: 200.0,
};

fn tracker_for(profile: &DeviceProfile) -> ParallaxTracker {
    ParallaxTracker::new(profile.allows_hover_effects(), 12.0, ParallaxConfig::default())
}

#[test]
fn corner_entry_then_leave_is_exactly_neutral() {
    let profile = DeviceProfile::from_signals(&DeviceSignals::default());
    let corners = [
        Vec2::new(CARD.left, CARD.top),
        Vec2::new(CARD.left + CARD.width, CARD.top),
        Vec2::new(CARD.left, CARD.top + CARD.height),
        Vec2::new(CARD.left + CARD.width, CARD.top + CARD.height),
    ];
    for corner in corners {
        let mut t = tracker_for(&profile);
        assert!(t.on_pointer_move(corner));
        let tilted = t.flush(CARD).unwrap().to_string();
        assert_ne!(tilted, neutral_transform(&ParallaxConfig::default()));
        t.on_pointer_leave();
        assert_eq!(t.transform(), neutral_transform(&ParallaxConfig::default()));
    }
}

#[test]
fn leave_with_a_frame_in_flight_cancels_it() {
    let profile = DeviceProfile::from_signals(&DeviceSignals::default());
    let mut t = tracker_for(&profile);
    assert!(t.on_pointer_move(Vec2::new(CARD.left, CARD.top)));
    assert!(t.on_pointer_leave());
    // a late frame callback must not re-tilt the card
    assert!(t.flush(CARD).is_none());
    assert_eq!(t.transform(), neutral_transform(&ParallaxConfig::default()));
}

#[test]
fn narrow_viewport_mounts_nothing_and_parallax_is_inert() {
    let cfg = FxConfig::default();
    let profile = DeviceProfile::from_signals(&DeviceSignals {
        inner_width: 500.0,
        ..Default::default()
    });
    assert!(!should_mount_background(&profile, "/", &cfg.floating.routes));
    assert!(!should_mount_cursor(&profile, "/", &cfg.cursor.routes));

    let mut t = tracker_for(&profile);
    for p in [Vec2::new(40.0, 80.0), Vec2::new(200.0, 180.0), Vec2::new(360.0, 280.0)] {
        assert!(!t.on_pointer_move(p));
        assert!(t.flush(CARD).is_none());
    }
    t.on_pointer_leave();
    assert_eq!(t.transform(), "");
}

#[test]
fn desktop_mounts_only_on_listed_routes() {
    let cfg = FxConfig::default();
    let profile = DeviceProfile::from_signals(&DeviceSignals::default());
    assert!(should_mount_background(&profile, "/dashboard", &cfg.floating.routes));
    assert!(should_mount_cursor(&profile, "/tasks/12", &cfg.cursor.routes));
    assert!(!should_mount_cursor(&profile, "/login", &cfg.cursor.routes));
    assert!(!route_matches("/login", &cfg.floating.routes));
}

#[test]
fn touch_laptop_keeps_background_but_not_cursor() {
    let cfg = FxConfig::default();
    let profile = DeviceProfile::from_signals(&DeviceSignals {
        touch_capable: true,
        ..Default::default()
    });
    assert!(should_mount_background(&profile, "/", &cfg.floating.routes));
    assert!(!should_mount_cursor(&profile, "/", &cfg.cursor.routes));
    assert!(!tracker_for(&profile).enabled());
}

#[test]
fn reduced_motion_skips_background_and_parallax() {
    let cfg = FxConfig::default();
    let profile = DeviceProfile::from_signals(&DeviceSignals {
        reduced_motion: true,
        ..Default::default()
    });
    assert!(!should_mount_background(&profile, "/", &cfg.floating.routes));
    assert!(!tracker_for(&profile).enabled());
}
