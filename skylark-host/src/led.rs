use embassy_stm32::gpio::{AnyPin, Output};

/// Three-channel status indicator on plain GPIO. Any non-zero intensity
/// turns a channel on; the board has no PWM budget reserved for the LED.
pub struct RgbLed {
    r: Output<'static, AnyPin>,
    g: Output<'static, AnyPin>,
    b: Output<'static, AnyPin>,
}

impl RgbLed {
    pub fn new(
        r: Output<'static, AnyPin>,
        g: Output<'static, AnyPin>,
        b: Output<'static, AnyPin>,
    ) -> Self {
        Self { r, g, b }
    }

    pub fn set_rgb(&mut self, r: u8, g: u8, b: u8) {
        set_channel(&mut self.r, r);
        set_channel(&mut self.g, g);
        set_channel(&mut self.b, b);
    }

    pub fn off(&mut self) {
        self.set_rgb(0, 0, 0);
    }
}

fn set_channel(pin: &mut Output<'static, AnyPin>, value: u8) {
    if value > 0 {
        pin.set_high();
    } else {
        pin.set_low();
    }
}
