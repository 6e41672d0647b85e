/**
 * Lowest default vibration intensity accepted by the belt.
 */
pub const INTENSITY_MIN: u8 = 0;

/**
 * Highest default vibration intensity accepted by the belt.
 */
pub const INTENSITY_MAX: u8 = 100;

/**
 * Value shown on the intensity slider while the belt has not reported its intensity.
 */
pub const INTENSITY_PLACEHOLDER: u8 = 50;

/**
 * Directions (degrees) are normalized into [0, FULL_CIRCLE).
 */
pub const FULL_CIRCLE: i32 = 360;

/**
 * How many ticks a command may stay unconfirmed before the reconciler gives up waiting.
 * The application ticks once per second.
 */
pub const PENDING_TIMEOUT_TICKS: u32 = 10;

/**
 * How many ticks an advisory stays visible.
 */
pub const ADVISORY_TICKS: u32 = 4;

/**
 * Capacity of the command channel between the application and the belt.
 */
pub const COMMAND_QUEUE_SIZE: usize = 32;

/**
 * Capacity of the event channel between the belt and the application.
 */
pub const EVENT_QUEUE_SIZE: usize = 64;
