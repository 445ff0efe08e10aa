//! Marker lifecycle tests: add, track, lose, remove, re-add

use arcircuit::prelude::*;
use arcircuit::{Depiction, EventKind, FrameDiagnostic, RenderCommand, VisualHandle};
use glam::Vec3;
use std::collections::HashMap;

fn kit() -> CircuitOrchestrator {
    CircuitConfig::builtin()
        .expect("Builtin config should parse")
        .into_orchestrator()
        .expect("Builtin config should be valid")
}

fn marker(name: &str, x: f32) -> TrackedMarker {
    TrackedMarker::tracking(name, Vec3::new(x, 0.0, 0.0))
}

fn battery_and_led() -> FrameEvents {
    FrameEvents::new()
        .added(marker("Battery", 0.0))
        .added(marker("LED", 0.05))
        .updated(marker("Battery", 0.0))
        .updated(marker("LED", 0.05))
}

/// Current visibility of every handle after replaying recorded commands.
fn visibility(commands: &[RenderCommand]) -> HashMap<VisualHandle, bool> {
    let mut shown = HashMap::new();
    for cmd in commands {
        match cmd {
            RenderCommand::Show { handle } => {
                shown.insert(*handle, true);
            }
            RenderCommand::Hide { handle } => {
                shown.insert(*handle, false);
            }
            RenderCommand::Destroy { handle } => {
                shown.remove(handle);
            }
            _ => {}
        }
    }
    shown
}

#[test]
fn test_readd_resets_state() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    orch.apply(&battery_and_led(), &mut port).unwrap();
    assert!(orch.component("LED").unwrap().enabled());

    let report = orch
        .apply(&FrameEvents::new().removed(marker("LED", 0.05)), &mut port)
        .unwrap();
    assert_eq!(report.removed, vec!["LED".to_string()]);
    assert!(orch.component("LED").is_none());

    orch.apply(&FrameEvents::new().added(marker("LED", 0.05)), &mut port)
        .unwrap();
    let led = orch.component("LED").unwrap();
    assert!(!led.powered());
    assert!(!led.enabled());
}

#[test]
fn test_remove_unknown_name_is_noop() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    let report = orch
        .apply(&FrameEvents::new().removed(marker("Motor", 0.0)), &mut port)
        .expect("Stale removal must not be fatal");

    assert!(report.removed.is_empty());
    assert_eq!(
        report.diagnostics,
        vec![FrameDiagnostic::StaleEventReference {
            name: "Motor".to_string(),
            event: EventKind::Removed,
        }]
    );
}

#[test]
fn test_one_visual_shown_while_tracked() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    orch.apply(&battery_and_led(), &mut port).unwrap();

    let shown = visibility(port.commands());
    for component in orch.live_components() {
        let on = shown[&component.handle(Depiction::On)];
        let off = shown[&component.handle(Depiction::Off)];
        assert!(on ^ off, "{} should show exactly one visual", component.name());
        assert_eq!(on, component.enabled());
    }
}

#[test]
fn test_lost_tracking_hides_both_visuals() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    orch.apply(&battery_and_led(), &mut port).unwrap();

    let frame = FrameEvents::new()
        .updated(marker("LED", 0.05).with_status(TrackingStatus::Stopped));
    let report = orch.apply(&frame, &mut port).unwrap();
    assert!(matches!(
        report.diagnostics.as_slice(),
        [FrameDiagnostic::MissingTrackingData { status: TrackingStatus::Stopped, .. }]
    ));

    let led = orch.component("LED").unwrap();
    let shown = visibility(port.commands());
    assert!(!shown[&led.handle(Depiction::On)]);
    assert!(!shown[&led.handle(Depiction::Off)]);
    // Power state survives a tracking gap.
    assert!(led.enabled());

    orch.apply(&FrameEvents::new().updated(marker("LED", 0.05)), &mut port)
        .unwrap();
    let led = orch.component("LED").unwrap();
    let shown = visibility(port.commands());
    assert!(shown[&led.handle(Depiction::On)]);
    assert!(!shown[&led.handle(Depiction::Off)]);
}

#[test]
fn test_moving_apart_depowers_both() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    orch.apply(&battery_and_led(), &mut port).unwrap();

    let frame = FrameEvents::new()
        .updated(marker("Battery", 0.0))
        .updated(marker("LED", 0.4));
    orch.apply(&frame, &mut port).unwrap();

    assert!(!orch.component("Battery").unwrap().powered());
    let led = orch.component("LED").unwrap();
    assert!(!led.powered());
    assert!(!led.enabled());
}

#[test]
fn test_chain_goes_dark_when_battery_leaves() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    let chain = |battery_x: f32| {
        FrameEvents::new()
            .updated(marker("Battery", battery_x))
            .updated(marker("USB", 0.05))
            .updated(marker("LED", 0.1))
    };

    let setup = FrameEvents::new()
        .added(marker("Battery", 0.0))
        .added(marker("USB", 0.05))
        .added(marker("LED", 0.1));
    orch.apply(&setup, &mut port).unwrap();
    orch.apply(&chain(0.0), &mut port).unwrap();
    orch.apply(&chain(0.0), &mut port).unwrap();
    assert!(orch.component("LED").unwrap().enabled(), "LED lit through the USB stick");

    for frame in 0..5 {
        let report = orch.apply(&chain(5.0), &mut port).unwrap();
        assert!(report.connections.is_empty(), "frame {}: {:?}", frame, report.connections);
        assert!(!orch.component("USB").unwrap().powered());
        let led = orch.component("LED").unwrap();
        assert!(!led.powered());
        assert!(!led.enabled(), "LED still lit with the battery 5 units away");
    }
}

#[test]
fn test_hidden_battery_does_not_cut_chain() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    let setup = FrameEvents::new()
        .added(marker("Battery", 0.0))
        .added(marker("USB", 0.05))
        .updated(marker("Battery", 0.0))
        .updated(marker("USB", 0.05));
    orch.apply(&setup, &mut port).unwrap();
    assert!(orch.component("USB").unwrap().powered());

    // Without a distance to the battery there is nothing to clear power with.
    let frame = FrameEvents::new()
        .updated(marker("Battery", 0.0).with_status(TrackingStatus::Limited))
        .updated(marker("USB", 0.05));
    orch.apply(&frame, &mut port).unwrap();
    assert!(orch.component("USB").unwrap().powered());
}

#[test]
fn test_sink_never_enabled_without_power() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    let frame = FrameEvents::new()
        .added(marker("Motor", 0.0))
        .added(marker("LED", 0.02))
        .updated(marker("Motor", 0.0))
        .updated(marker("LED", 0.02));

    for _ in 0..3 {
        orch.apply(&frame, &mut port).unwrap();
        for component in orch.live_components() {
            assert!(!component.enabled(), "{} has no source", component.name());
        }
    }
}

#[test]
fn test_removed_visuals_are_destroyed() {
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    orch.apply(&battery_and_led(), &mut port).unwrap();
    let led = orch.component("LED").unwrap();
    let handles = [led.handle(Depiction::On), led.handle(Depiction::Off)];
    port.drain();

    orch.apply(&FrameEvents::new().removed(marker("LED", 0.0)), &mut port)
        .unwrap();
    let destroyed: Vec<_> = port
        .commands()
        .iter()
        .filter(|c| matches!(c, RenderCommand::Destroy { .. }))
        .map(|c| c.handle())
        .collect();
    assert_eq!(destroyed, handles.to_vec());
}

#[test]
fn test_batches_apply_in_order() {
    // Added, updated and removed in one frame: the component is created,
    // swept and released before the frame ends.
    let mut orch = kit();
    let mut port = CommandBuffer::new();
    let frame = FrameEvents::new()
        .added(marker("USB", 0.0))
        .updated(marker("USB", 0.0))
        .removed(marker("USB", 0.0));
    let report = orch.apply(&frame, &mut port).unwrap();

    assert_eq!(report.added, vec!["USB".to_string()]);
    assert_eq!(report.swept, vec!["USB".to_string()]);
    assert_eq!(report.removed, vec!["USB".to_string()]);
    assert_eq!(orch.live_count(), 0);
    assert!(report.is_clean());
}
