//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements            | Connects to                  |
//! |----------------|-----------------------|------------------------------|
//! | `lock_board`   | Actuator, Buzzer,     | Servo, buzzer, LCD, keypad,  |
//! |                | Display, Keypad, Door | reed switch, LED             |
//! | `bridge_board` | Network, SignalIn,    | Wi-Fi, signal sampler, UART, |
//! |                | Serial, Clock         | clock                        |
//! | `signal_wire`  | SignalOut / SignalIn  | `embedded-hal` GPIO pins     |
//! | `serial_link`  | SerialPort            | UART / in-memory loopback    |
//! | `wifi`         | NetworkPort           | ESP-IDF WiFi STA + portal    |
//! | `remote_store` | RemoteStore           | In-memory JSON document      |
//! | `nvs`          | StoragePort           | NVS / in-memory store        |
//! | `time`         | ClockPort             | ESP32 system timer, SNTP     |
//! | `log_sink`     | EventSink             | Serial log output            |

pub mod bridge_board;
pub mod lock_board;
pub mod log_sink;
pub mod nvs;
pub mod remote_store;
pub mod serial_link;
pub mod signal_wire;
pub mod time;
pub mod wifi;
