//! One-shot hardware peripheral initialization.
//!
//! Configures GPIO directions, the servo LEDC timer, the LCD I²C bus, the
//! inter-controller UART and the knock-sensor ISR using raw ESP-IDF sys
//! calls.  Called once from `main()` before the control loop starts.
//!
//! Also exposes the thin register helpers (`gpio_read`, `gpio_write`,
//! `ledc_set`, `i2c_write`) the drivers build on, and [`RawPin`], an
//! `embedded-hal` pin over them.  On host targets every helper is inert.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    I2cInitFailed(i32),
    UartInitFailed(i32),
    IsrInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C master init failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "UART driver install failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
        }
    }
}

/// Which controller this board runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardRole {
    Lock,
    Bridge,
}

#[cfg(target_os = "espidf")]
fn check(ret: esp_err_t, err: fn(i32) -> HwInitError) -> Result<(), HwInitError> {
    if ret == ESP_OK as esp_err_t {
        Ok(())
    } else {
        Err(err(ret))
    }
}

// ── Entry points ──────────────────────────────────────────────

/// Read the role strap.
#[cfg(target_os = "espidf")]
pub fn read_role() -> BoardRole {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ROLE_SELECT_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: single-threaded boot path.
    unsafe { gpio_config(&cfg) };
    if gpio_read(pins::ROLE_SELECT_GPIO) {
        BoardRole::Lock
    } else {
        BoardRole::Bridge
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals(role: BoardRole) -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the control loop; single-threaded.
    unsafe {
        match role {
            BoardRole::Lock => {
                init_lock_inputs()?;
                init_outputs(&[
                    pins::BUZZER_GPIO,
                    pins::INDICATOR_LED_GPIO,
                    pins::SIGNAL_REG_GPIO,
                    pins::SIGNAL_TAMPER_GPIO,
                    pins::SIGNAL_LOCK_GPIO,
                ])?;
                init_outputs(&pins::KEYPAD_ROW_GPIOS)?;
                init_servo_ledc()?;
                init_i2c()?;
            }
            BoardRole::Bridge => {
                init_inputs(
                    &[pins::SIGNAL_REG_GPIO, pins::SIGNAL_TAMPER_GPIO, pins::SIGNAL_LOCK_GPIO],
                    gpio_pullup_t_GPIO_PULLUP_DISABLE,
                )?;
            }
        }
        init_uart()?;
    }
    info!("hw_init: {:?} board peripherals configured", role);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(role: BoardRole) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): {:?} peripheral init skipped", role);
    Ok(())
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_inputs(input_pins: &[i32], pull_up: gpio_pullup_t) -> Result<(), HwInitError> {
    for &pin in input_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: pull_up,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        check(unsafe { gpio_config(&cfg) }, HwInitError::GpioConfigFailed)?;
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_lock_inputs() -> Result<(), HwInitError> {
    unsafe {
        init_inputs(&pins::KEYPAD_COL_GPIOS, gpio_pullup_t_GPIO_PULLUP_ENABLE)?;
        init_inputs(&[pins::DOOR_REED_GPIO], gpio_pullup_t_GPIO_PULLUP_ENABLE)?;
        // GPIO34 is input-only without internal pulls; the module drives it.
        init_inputs(&[pins::KNOCK_SENSOR_GPIO], gpio_pullup_t_GPIO_PULLUP_DISABLE)?;
    }
    info!("hw_init: lock GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_outputs(output_pins: &[i32]) -> Result<(), HwInitError> {
    for &pin in output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        check(unsafe { gpio_config(&cfg) }, HwInitError::GpioConfigFailed)?;
        unsafe { gpio_set_level(pin, 0) };
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured input.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: register write on a configured output; main loop only.
    unsafe { gpio_set_level(pin, u32::from(high)) };
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

/// A GPIO number exposed through the `embedded-hal` digital traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPin(pub i32);

impl embedded_hal::digital::ErrorType for RawPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for RawPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, true);
        Ok(())
    }
}

impl embedded_hal::digital::InputPin for RawPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!gpio_read(self.0))
    }
}

// ── LEDC PWM (servo) ─────────────────────────────────────────

pub const LEDC_CH_SERVO: u32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_servo_ledc() -> Result<(), HwInitError> {
    let timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_14_BIT,
        freq_hz: pins::SERVO_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    check(unsafe { ledc_timer_config(&timer) }, HwInitError::LedcInitFailed)?;

    let channel = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: LEDC_CH_SERVO,
        timer_sel: ledc_timer_t_LEDC_TIMER_0,
        gpio_num: pins::SERVO_GPIO,
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    check(unsafe { ledc_channel_config(&channel) }, HwInitError::LedcInitFailed)?;

    info!("hw_init: LEDC configured (servo=CH0, 50 Hz, 14-bit)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u32) {
    // SAFETY: channel configured in init_servo_ledc(); main loop only.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, duty);
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u32) {}

// ── I²C (LCD backpack) ───────────────────────────────────────

pub const I2C_PORT: i32 = 0;

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let mut cfg = i2c_config_t {
        mode: i2c_mode_t_I2C_MODE_MASTER,
        sda_io_num: pins::I2C_SDA_GPIO,
        scl_io_num: pins::I2C_SCL_GPIO,
        sda_pullup_en: true,
        scl_pullup_en: true,
        ..Default::default()
    };
    cfg.__bindgen_anon_1.master.clk_speed = pins::I2C_FREQ_HZ;
    check(unsafe { i2c_param_config(I2C_PORT, &cfg) }, HwInitError::I2cInitFailed)?;
    check(
        unsafe { i2c_driver_install(I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0) },
        HwInitError::I2cInitFailed,
    )?;
    info!("hw_init: I2C0 master configured");
    Ok(())
}

/// Write raw bytes to an I²C device.  Returns `false` on NACK/timeout.
#[cfg(target_os = "espidf")]
pub fn i2c_write(addr: u8, bytes: &[u8]) -> bool {
    // SAFETY: driver installed in init_i2c(); bytes valid for the call.
    let ret = unsafe {
        i2c_master_write_to_device(I2C_PORT, addr, bytes.as_ptr(), bytes.len(), 10)
    };
    ret == ESP_OK as esp_err_t
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write(_addr: u8, _bytes: &[u8]) -> bool {
    true
}

// ── UART (inter-controller link) ─────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::LINK_UART_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let port = pins::LINK_UART_PORT;
    check(
        unsafe { uart_driver_install(port, 256, 0, 0, core::ptr::null_mut(), 0) },
        HwInitError::UartInitFailed,
    )?;
    check(unsafe { uart_param_config(port, &cfg) }, HwInitError::UartInitFailed)?;
    check(
        unsafe {
            uart_set_pin(port, pins::LINK_UART_TX_GPIO, pins::LINK_UART_RX_GPIO, -1, -1)
        },
        HwInitError::UartInitFailed,
    )?;
    info!("hw_init: UART{} link configured ({} baud)", port, pins::LINK_UART_BAUD);
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn knock_gpio_isr(_arg: *mut core::ffi::c_void) {
    crate::events::TAMPER_FLAG.raise();
}

/// Install the GPIO ISR service and hook the knock sensor.
/// Call after [`init_peripherals`] on the lock board only.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed.
    // The handler only stores to an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_set_intr_type(pins::KNOCK_SENSOR_GPIO, gpio_int_type_t_GPIO_INTR_POSEDGE);
        check(
            gpio_isr_handler_add(pins::KNOCK_SENSOR_GPIO, Some(knock_gpio_isr), core::ptr::null_mut()),
            HwInitError::IsrInstallFailed,
        )?;
        gpio_intr_enable(pins::KNOCK_SENSOR_GPIO);
    }
    info!("hw_init: ISR service installed (knock sensor)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
