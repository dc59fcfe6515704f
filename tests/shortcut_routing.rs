//! Keystroke routing across layers through the public API.

use std::sync::Arc;

use parking_lot::Mutex;
use toolgate::shortcuts::{format_for_display, normalize};
use toolgate::{Config, KeyFlags, ShortcutBinding, ShortcutLayer, ShortcutRegistry};

fn recorder(
    log: &Arc<Mutex<Vec<String>>>,
    label: &str,
    consumed: bool,
) -> impl Fn() -> anyhow::Result<bool> + Send + Sync + 'static {
    let log = log.clone();
    let label = label.to_string();
    move || {
        log.lock().push(label.clone());
        Ok(consumed)
    }
}

fn assistant_registry(log: &Arc<Mutex<Vec<String>>>) -> ShortcutRegistry {
    let registry = Config::default().build_registry();
    registry.register(
        ShortcutBinding::new(
            "ctrl+c",
            ShortcutLayer::Global,
            recorder(log, "global:interrupt", false),
        )
        .with_id("interrupt"),
    );
    registry.register(
        ShortcutBinding::new("ctrl+c", ShortcutLayer::Screen, recorder(log, "screen:copy", false))
            .with_id("copy"),
    );
    registry.register(
        ShortcutBinding::new("up", ShortcutLayer::Input, recorder(log, "input:history", true))
            .with_id("history"),
    );
    registry.register(
        ShortcutBinding::new("up", ShortcutLayer::Screen, recorder(log, "screen:scroll", true))
            .with_id("scroll"),
    );
    registry
}

#[test]
fn input_layer_hides_screen_bindings_but_not_global() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = assistant_registry(&log);

    registry.set_active_layer(ShortcutLayer::Input);
    assert!(!registry.dispatch("c", &KeyFlags::ctrl()));
    assert_eq!(*log.lock(), vec!["global:interrupt"]);
}

#[test]
fn screen_layer_tries_screen_then_global() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = assistant_registry(&log);

    registry.set_active_layer(ShortcutLayer::Screen);
    assert!(!registry.dispatch("c", &KeyFlags::ctrl()));
    assert_eq!(*log.lock(), vec!["screen:copy", "global:interrupt"]);
}

#[test]
fn higher_layer_keeps_capturing_below_the_active_layer() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = assistant_registry(&log);
    let up = KeyFlags {
        up: true,
        ..KeyFlags::default()
    };

    registry.set_active_layer(ShortcutLayer::Input);
    assert!(registry.dispatch("", &up));
    registry.set_active_layer(ShortcutLayer::Screen);
    assert!(registry.dispatch("", &up));
    assert_eq!(*log.lock(), vec!["input:history", "input:history"]);

    assert!(registry.unregister("history"));
    assert!(registry.dispatch("", &up));
    assert_eq!(
        *log.lock(),
        vec!["input:history", "input:history", "screen:scroll"]
    );
}

#[test]
fn disabled_higher_binding_lets_the_key_fall_through() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = ShortcutRegistry::new();
    registry.register(
        ShortcutBinding::new(
            "up",
            ShortcutLayer::Input,
            recorder(&log, "input:history", true),
        )
        .enabled_when(|| false),
    );
    registry.register(ShortcutBinding::new(
        "up",
        ShortcutLayer::Screen,
        recorder(&log, "screen:scroll", true),
    ));
    let up = KeyFlags {
        up: true,
        ..KeyFlags::default()
    };

    assert!(registry.dispatch("", &up));
    assert_eq!(*log.lock(), vec!["screen:scroll"]);
}

#[test]
fn failing_handler_does_not_block_the_next_binding() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = ShortcutRegistry::new();
    registry.register(
        ShortcutBinding::new("ctrl+s", ShortcutLayer::Screen, || anyhow::bail!("disk full"))
            .with_priority(10),
    );
    registry.register(ShortcutBinding::new(
        "ctrl+s",
        ShortcutLayer::Screen,
        recorder(&log, "save", true),
    ));

    assert!(registry.dispatch("s", &KeyFlags::ctrl()));
    assert_eq!(*log.lock(), vec!["save"]);
}

#[test]
fn help_text_uses_display_form() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = assistant_registry(&log);

    let combos: Vec<String> = registry
        .bindings_for_layer(ShortcutLayer::Global)
        .into_iter()
        .map(|info| format_for_display(&info.combo))
        .collect();
    assert_eq!(combos, vec!["Ctrl+C"]);
    assert_eq!(normalize("Shift+CTRL+Up"), "ctrl+shift+up");
}
