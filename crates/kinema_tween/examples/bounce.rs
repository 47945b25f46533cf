//! Bounce Demo
//!
//! Drives a ball with a fixed 60 Hz frame loop:
//! - a `to` tween drops the ball with a bounce easing
//! - a second tween on the same property starts halfway and overwrites the
//!   first, which stops where it is
//! - a `by` tween nudges the ball sideways in the late update phase
//!
//! Run with: cargo run -p kinema_tween --example bounce
//! Set `RUST_LOG=kinema=debug` to see tween lifecycle logs.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use glam::Vec2;
use kinema_tween::{
    Animatable, Easing, LogLevel, ManualClock, Scheduler, TweenRequest, TweenValue, UpdatePhase,
};
use tracing_subscriber::EnvFilter;

struct Ball {
    position: Cell<Vec2>,
    height: Cell<f32>,
}

impl Animatable for Ball {
    fn get_property(&self, property: &str) -> Option<TweenValue> {
        match property {
            "position" => Some(self.position.get().into()),
            "height" => Some(self.height.get().into()),
            _ => None,
        }
    }

    fn set_property(&self, property: &str, value: TweenValue) -> bool {
        match (property, value) {
            ("position", TweenValue::Vec2(v)) => self.position.set(v),
            ("height", TweenValue::Float(v)) => self.height.set(v),
            _ => return false,
        }
        true
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let clock = ManualClock::new();
    let mut scheduler = Scheduler::new(Rc::new(clock.clone()));
    scheduler.defaults().set_log_level(LogLevel::Debug);

    let ball = Rc::new(Ball {
        position: Cell::new(Vec2::ZERO),
        height: Cell::new(10.0),
    });

    let template = scheduler
        .create_template()
        .with_easing(Easing::BounceOut)
        .with_duration(2.0);
    let drop_group = scheduler.create_group_with(&template);
    scheduler.add(drop_group, TweenRequest::to("height", 0.0f32).on(&ball))?;

    scheduler
        .group_options(drop_group)?
        .on_complete(|event| tracing::info!(reason = ?event.reason, "drop finished"));

    let slide = scheduler.on(&ball);
    let nudge = scheduler.by(slide, "position", Vec2::new(4.0, 0.0), 1.5)?;
    scheduler
        .tween_options(nudge)?
        .set_phase(UpdatePhase::LateUpdate);

    const DT: f32 = 1.0 / 60.0;
    for frame in 0..180 {
        if frame == 60 {
            let lift = scheduler.on(&ball);
            scheduler.to(lift, "height", 5.0f32, 1.0)?;
            tracing::info!("lift queued");
        }

        scheduler.tick(UpdatePhase::Update);
        scheduler.tick(UpdatePhase::LateUpdate);

        if frame % 15 == 0 {
            let position = ball.position.get();
            tracing::info!(
                frame,
                height = ball.height.get(),
                x = position.x,
                "ball"
            );
        }
        clock.advance(DT);
    }

    let stats = scheduler.stats();
    tracing::info!(
        tweens = stats.tweens,
        groups = stats.groups,
        pooled_tweens = stats.pooled_tweens,
        pooled_groups = stats.pooled_groups,
        "done"
    );
    Ok(())
}
