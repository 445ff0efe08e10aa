//! Battery and LED example: slide an LED towards a battery and watch it light up.

use arcircuit::prelude::*;
use glam::Vec3;

fn main() -> Result<(), ArCircuitError> {
    let mut sim = Simulation::builtin()?;

    let battery = TrackedMarker::tracking("Battery", Vec3::ZERO);
    let led_at = |x: f32| TrackedMarker::tracking("LED", Vec3::new(x, 0.0, 0.0));

    sim.step(&FrameEvents::new().added(battery.clone()).added(led_at(0.3)))?;

    for x in [0.3, 0.2, 0.12, 0.08, 0.04] {
        let frame = FrameEvents::new().updated(battery.clone()).updated(led_at(x));
        let output = sim.step(&frame)?;
        for state in output.components.iter().filter(|c| c.name == "LED") {
            println!(
                "LED at {:.2}: {}",
                x,
                if state.enabled { "ON" } else { "off" }
            );
        }
    }

    let commands = sim.teardown();
    println!("\nTeardown issued {} render commands.", commands.len());
    Ok(())
}
