//! # Copos — Cooperative Scheduler
//!
//! A tick-driven, cooperative task scheduler for resource-constrained
//! microcontrollers. It stands in for an RTOS where a fixed table of
//! deferred and periodic callbacks is all an application needs.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                    Application Tasks                    │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │   init() · add_task() · start() · tick() · run()       │
//! ├──────────────┬────────────────────┬───────────────────┤
//! │  Scheduler   │   Status Reporter  │  Sync Primitives  │
//! │  scheduler.rs│   status.rs        │  sync.rs          │
//! │  ─ tick()    │   ─ report()       │  ─ critical_section│
//! │  ─ dispatch()│                    │                   │
//! │  ─ registry  │                    │                   │
//! ├──────────────┴────────────────────┴───────────────────┤
//! │         Task Table (table.rs) · Task Slot (task.rs)     │
//! ├────────────────────────────────────────────────────────┤
//! │   Ports (port.rs): TickTimer · Idle · IndicatorPort     │
//! ├────────────────────────────────────────────────────────┤
//! │      Arch Port (arch/cortex_m4.rs): SysTick · WFI      │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Timing Model
//!
//! A task added with `delay = D, period = P` first runs at tick `D`, then
//! at `D + P`, `D + 2P`, … until deleted. With `P = 0` it runs once at
//! tick `D` and its slot is freed. Tasks due in the same tick run in slot
//! order.
//!
//! ## Memory Model
//!
//! - **No heap**: All state is statically allocated
//! - **No `alloc`**: Pure `core` only
//! - **Fixed-size table**: `[TaskSlot; MAX_TASKS]`
//! - **Critical sections**: `critical_section::with()` around all shared state

#![no_std]

pub mod arch;
pub mod config;
pub mod error;
pub mod kernel;
pub mod port;
pub mod scheduler;
pub mod status;
pub mod sync;
pub mod table;
pub mod task;

pub use config::{SchedulerConfig, MAX_TASKS};
pub use error::SchedulerError;
pub use port::{Idle, IndicatorPort, TickTimer};
pub use scheduler::Scheduler;
pub use table::TaskId;
pub use task::{ContextTask, Runnable, SlotInfo};
