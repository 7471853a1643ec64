//! Host-side simulation of a serial echo firmware.
//!
//! A background thread plays the role of the UART hardware: it places bytes
//! in the receive register and fires the receive vector, the way the
//! interrupt controller would. The handler attached by `main` echoes every
//! byte back, and a timer vector toggles a LED through a method callback.
//!
//! Run with `cargo run --example serial_echo --features std,tracing`.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering},
    },
    thread,
    time::Duration,
};

use irqcall::prelude::*;
use tracing_subscriber::{Registry, layer::SubscriberExt};

/// The receive and transmit registers of a simulated UART.
struct Uart {
    rx: AtomicU8,
    tx: Mutex<Vec<u8>>,
}

impl Uart {
    fn echo(&self) {
        let byte = self.rx.load(Ordering::Acquire);
        self.write(byte);
    }

    fn write(&self, byte: u8) {
        self.tx
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(byte);
    }
}

struct Led {
    on: AtomicBool,
    toggles: AtomicU32,
}

impl Led {
    fn toggle(&self) {
        self.on.fetch_xor(true, Ordering::Relaxed);
        self.toggles.fetch_add(1, Ordering::Relaxed);
    }
}

static UART: Uart = Uart {
    rx: AtomicU8::new(0),
    tx: Mutex::new(Vec::new()),
};

static LED: Led = Led {
    on: AtomicBool::new(false),
    toggles: AtomicU32::new(0),
};

static SERIAL: SerialVectors = SerialVectors::new();
static TIMER: Vector = Vector::new();

static WRITE: Callback1<'static, u8, ()> = Callback1::from_method(&UART, Uart::write);

/// Simulated interrupt line: latches each byte and fires the receive vector.
fn hardware(input: &'static [u8]) {
    for (tick, &byte) in input.iter().enumerate() {
        UART.rx.store(byte, Ordering::Release);
        if let Dispatch::Busy = SERIAL.fire(SerialIrq::Rx) {
            tracing::warn!(byte, "receive interrupt dropped");
        }
        if tick % 4 == 0 && TIMER.fire() == Dispatch::Busy {
            tracing::warn!(tick, "timer interrupt dropped");
        }
        thread::sleep(Duration::from_millis(1));
    }
}

fn main() -> Result<(), BufferTooSmall> {
    let subscriber = Registry::default().with(tracing_subscriber::fmt::layer());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("a global subscriber was already installed");
    }

    // Greet on the first transmit-empty interrupt with a deferred call.
    let greeting = Handler::<'static, ()>::Deferred(WRITE.deferred(b'>')?);
    SERIAL.attach(SerialIrq::Tx, greeting);
    if let Dispatch::Busy = SERIAL.fire(SerialIrq::Tx) {
        tracing::warn!("greeting dropped");
    }
    SERIAL.detach(SerialIrq::Tx);

    SERIAL.attach(SerialIrq::Rx, Callback0::from_method(&UART, Uart::echo));
    TIMER.attach(Callback0::from_method(&LED, Led::toggle));

    let line = thread::spawn(|| hardware(b"hello, irq\n"));
    if line.join().is_err() {
        tracing::error!("interrupt thread panicked");
    }

    let echoed = UART
        .tx
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone();
    tracing::info!(
        echoed = %String::from_utf8_lossy(&echoed).escape_debug(),
        led_on = LED.on.load(Ordering::Relaxed),
        toggles = LED.toggles.load(Ordering::Relaxed),
        "done"
    );

    Ok(())
}
