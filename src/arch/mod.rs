//! # Architecture Abstraction Layer
//!
//! Board-side implementations of the [`crate::port`] traits. Currently
//! implements the Cortex-M4 port; other targets add sibling modules.

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub mod cortex_m4;

/// Rewrite a GPIO mode register so pins `first..first + count` are
/// general-purpose outputs (`0b01`), leaving every other pin as it was.
///
/// MODER holds two bits per pin; pins past 15 are ignored.
pub const fn moder_with_outputs(moder: u32, first: u32, count: u32) -> u32 {
    let mut next = moder;
    let mut pin = first;
    while pin < first + count && pin < 16 {
        next = (next & !(0b11 << (pin * 2))) | (0b01 << (pin * 2));
        pin += 1;
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_byte_becomes_output() {
        // PD8–PD15 in analog mode, PD0–PD7 as alternate function.
        let moder = 0xFFFF_AAAA;
        assert_eq!(moder_with_outputs(moder, 8, 8), 0x5555_AAAA);
    }

    #[test]
    fn test_lower_byte_leaves_upper_alone() {
        assert_eq!(moder_with_outputs(0xC000_0003, 0, 8), 0xC000_5555);
    }

    #[test]
    fn test_single_pin_and_overflow() {
        // PD12 only.
        assert_eq!(moder_with_outputs(0, 12, 1), 0x0100_0000);
        // Pins past 15 do not wrap into the low half.
        assert_eq!(moder_with_outputs(0, 14, 8), 0x5000_0000);
    }
}
