//! GPIO / peripheral pin assignments for the lock board and the bridge board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Both boards run the same firmware image; the
//! role is picked at boot.

// ---------------------------------------------------------------------------
// Lock board: bolt servo (SG90, 50 Hz PWM)
// ---------------------------------------------------------------------------

pub const SERVO_GPIO: i32 = 13;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC resolution for the servo (14 bits → 16384 steps per 20 ms frame).
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2_500;

// ---------------------------------------------------------------------------
// Lock board: feedback
// ---------------------------------------------------------------------------

/// Active buzzer, HIGH = sounding.
pub const BUZZER_GPIO: i32 = 12;
/// Red indicator LED, HIGH = lit (bolt thrown).
pub const INDICATOR_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Lock board: sensors
// ---------------------------------------------------------------------------

/// Reed switch on the door frame.  LOW = closed (magnet present).
pub const DOOR_REED_GPIO: i32 = 27;
/// SW-420 vibration sensor, rising edge on knock.
pub const KNOCK_SENSOR_GPIO: i32 = 34;

// ---------------------------------------------------------------------------
// Lock board: 4×4 matrix keypad
// ---------------------------------------------------------------------------

/// Row lines, driven LOW one at a time while scanning.
pub const KEYPAD_ROW_GPIOS: [i32; 4] = [32, 33, 25, 26];
/// Column lines, inputs with pull-ups.
pub const KEYPAD_COL_GPIOS: [i32; 4] = [14, 4, 16, 17];

// ---------------------------------------------------------------------------
// Lock board: 16×2 character LCD (HD44780 behind a PCF8574 I²C backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;
pub const LCD_I2C_ADDR: u8 = 0x27;

// ---------------------------------------------------------------------------
// Signal lines (lock drives, bridge samples)
// ---------------------------------------------------------------------------

pub const SIGNAL_REG_GPIO: i32 = 18;
pub const SIGNAL_TAMPER_GPIO: i32 = 19;
pub const SIGNAL_LOCK_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// Inter-controller UART
// ---------------------------------------------------------------------------

pub const LINK_UART_PORT: i32 = 2;
pub const LINK_UART_TX_GPIO: i32 = 5;
pub const LINK_UART_RX_GPIO: i32 = 15;
pub const LINK_UART_BAUD: u32 = 115_200;

// ---------------------------------------------------------------------------
// Boot strap: role select (external pull-up; jumper to GND = bridge)
// ---------------------------------------------------------------------------

pub const ROLE_SELECT_GPIO: i32 = 35;
