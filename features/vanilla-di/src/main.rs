use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing_subscriber::EnvFilter;
use vanilla_di::{Component, ComponentBuilder, DiBuilder, Discoverable};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = DiBuilder::new()
        .discover::<TestComponent>()
        .discover::<ElectricPowerSwitch>()
        .discover::<LightBulb>();

    match app.build() {
        Ok(container) => println!("{:?}", container),
        Err(e) => {
            eprintln!("Resolution failed: {e}");
            std::process::exit(1);
        }
    }
}

struct LightBulb;
impl LightBulb {
    fn turn_on(&self) {
        println!("LightBulb: Bulb turned on...");
    }

    fn turn_off(&self) {
        println!("LightBulb: Bulb turned off...");
    }
}
impl Discoverable for LightBulb {
    fn component() -> ComponentBuilder<Self> {
        Component::of::<Self>().constructor(|| LightBulb)
    }
}

struct ElectricPowerSwitch {
    client: Arc<LightBulb>,
    on: AtomicBool,
}
impl ElectricPowerSwitch {
    fn new(client: Arc<LightBulb>) -> Self {
        Self {
            client,
            on: AtomicBool::new(false),
        }
    }

    fn press(&self) {
        if self.on.fetch_xor(true, Ordering::SeqCst) {
            self.client.turn_off();
        } else {
            self.client.turn_on();
        }
    }
}
impl Discoverable for ElectricPowerSwitch {
    fn component() -> ComponentBuilder<Self> {
        Component::of::<Self>().constructor(ElectricPowerSwitch::new)
    }
}

struct TestComponent;
impl Discoverable for TestComponent {
    fn component() -> ComponentBuilder<Self> {
        Component::of::<Self>().constructor(|client: Arc<ElectricPowerSwitch>| {
            client.press();
            client.press();
            TestComponent
        })
    }
}
