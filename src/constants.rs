pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

pub const DEFAULT_TOKEN_EXPIRY_HOURS: u64 = 3;

pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// Field limits shared by signup and update payloads.
pub const USERNAME_LEN: (usize, usize) = (2, 50);
pub const EMAIL_MAX_LEN: usize = 100;
pub const PASSWORD_LEN: (usize, usize) = (8, 20);
pub const NAME_LEN: (usize, usize) = (2, 50);
pub const PHONE_LEN: (usize, usize) = (10, 15);
pub const CITY_LEN: (usize, usize) = (2, 100);
pub const ADDRESS_LEN: (usize, usize) = (2, 100);
pub const AMKA_LEN: (usize, usize) = (11, 15);
pub const AFM_LEN: (usize, usize) = (9, 15);
