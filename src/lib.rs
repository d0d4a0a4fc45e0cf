//! DMA-fed PWM wavetable generator for the Daisy Seed.
//!
//! A free-running sample clock (TIM2) raises one DMA request per output
//! sample; a circular DMA transfer copies the active lookup table into the
//! PWM compare register (TIM3->CCR3) with no per-sample CPU work. The user
//! button cycles through the waveform set; the switch path halts the
//! transfer, swaps table and rate as one unit, and restarts streaming.
//!
//! Everything outside the `board` module is hardware-free and runs on the
//! host, with the DMA engine, sample timer and display reached through
//! trait seams.
#![cfg_attr(not(test), no_std)]

pub mod display;
pub mod fault;
pub mod rate;
pub mod selector;
pub mod streamer;
pub mod waveform;

#[cfg(feature = "seed")]
pub mod board;

#[cfg(feature = "seed")]
pub use stm32h7xx_hal as hal;

/// Output signal frequency the tables are streamed at, in Hz.
pub const DEFAULT_SIGNAL_HZ: u32 = 440;

/// Minimum spacing between accepted button edges, in milliseconds.
pub const DEBOUNCE_WINDOW_MS: u32 = 50;
