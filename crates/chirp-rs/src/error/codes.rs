//! Numeric API error codes returned in the `errors[].code` field.

pub const AUTHENTICATION_PROBLEM: i64 = 32;
pub const RESOURCE_NOT_FOUND: i64 = 34;
pub const SUSPENDED_ACCOUNT: i64 = 64;
pub const DEPRECATED_CALL: i64 = 68;
pub const RATE_LIMIT_EXCEEDED: i64 = 88;
pub const INVALID_OR_EXPIRED_TOKEN: i64 = 89;
pub const SSL_REQUIRED: i64 = 92;
pub const UNABLE_TO_VERIFY_CREDENTIALS: i64 = 99;
pub const OVER_CAPACITY: i64 = 130;
pub const INTERNAL_ERROR: i64 = 131;
pub const OAUTH_TIMESTAMP_OUT_OF_RANGE: i64 = 135;
pub const ALREADY_FAVORITED: i64 = 139;
pub const STATUS_NOT_FOUND: i64 = 144;
pub const CANNOT_MESSAGE_USER: i64 = 150;
pub const MESSAGE_SEND_FAILED: i64 = 151;
pub const FOLLOW_ALREADY_REQUESTED: i64 = 160;
pub const FOLLOW_LIMIT_EXCEEDED: i64 = 161;
pub const PROTECTED_STATUS: i64 = 179;
pub const OVER_UPDATE_LIMIT: i64 = 185;
pub const DUPLICATE_STATUS: i64 = 187;
pub const BAD_AUTHENTICATION_DATA: i64 = 215;
pub const SPAM: i64 = 226;
pub const LOGIN_VERIFICATION_NEEDED: i64 = 231;
pub const ENDPOINT_RETIRED: i64 = 251;
pub const CANNOT_WRITE: i64 = 261;
pub const CANNOT_MUTE: i64 = 271;
pub const CANNOT_UNMUTE: i64 = 272;
pub const ALREADY_RETWEETED: i64 = 327;

const TABLE: &[(i64, &str)] = &[
    (AUTHENTICATION_PROBLEM, "authentication problem"),
    (RESOURCE_NOT_FOUND, "resource not found"),
    (SUSPENDED_ACCOUNT, "suspended account"),
    (DEPRECATED_CALL, "deprecated call"),
    (RATE_LIMIT_EXCEEDED, "rate limit exceeded"),
    (INVALID_OR_EXPIRED_TOKEN, "invalid or expired token"),
    (SSL_REQUIRED, "SSL required"),
    (UNABLE_TO_VERIFY_CREDENTIALS, "unable to verify credentials"),
    (OVER_CAPACITY, "over capacity"),
    (INTERNAL_ERROR, "internal error"),
    (OAUTH_TIMESTAMP_OUT_OF_RANGE, "OAuth timestamp out of range"),
    (ALREADY_FAVORITED, "already favorited"),
    (STATUS_NOT_FOUND, "status not found"),
    (CANNOT_MESSAGE_USER, "cannot message user"),
    (MESSAGE_SEND_FAILED, "message send failed"),
    (FOLLOW_ALREADY_REQUESTED, "follow already requested"),
    (FOLLOW_LIMIT_EXCEEDED, "follow limit exceeded"),
    (PROTECTED_STATUS, "protected status"),
    (OVER_UPDATE_LIMIT, "over update limit"),
    (DUPLICATE_STATUS, "duplicate status"),
    (BAD_AUTHENTICATION_DATA, "bad authentication data"),
    (SPAM, "request looks automated"),
    (LOGIN_VERIFICATION_NEEDED, "login verification needed"),
    (ENDPOINT_RETIRED, "endpoint retired"),
    (CANNOT_WRITE, "application cannot perform write actions"),
    (CANNOT_MUTE, "cannot mute yourself"),
    (CANNOT_UNMUTE, "cannot unmute a user you are not muting"),
    (ALREADY_RETWEETED, "already retweeted"),
];

/// Short description of a known error code.
pub fn describe(code: i64) -> Option<&'static str> {
    TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
