//! Fixed patterns of the character-class and format rules.
//!
//! Every pattern is compiled case-insensitive and must stay free of
//! look-around, which the regex engine does not support.

pub(crate) const REQUIRED: &str = r"\S+";
pub(crate) const ACCEPTED: &str = r"^(yes|on|1|true)$";

pub(crate) const ALPHA: &str = r"^\p{L}+$";
pub(crate) const ALPHA_SPACES: &str = r"^[\p{L}\s]+$";
pub(crate) const ALPHA_NUM: &str = r"^[\p{L}\p{Nd}]+$";
pub(crate) const ALPHA_NUM_SPACES: &str = r"^[\p{L}\p{Nd}\s]+$";
pub(crate) const ALPHA_DASH: &str = r"^[\p{L}\p{Nd}_-]+$";
pub(crate) const ALPHA_DASH_SPACES: &str = r"^[\p{L}\p{Nd}\s_-]+$";

pub(crate) const BOOLEAN: &str = r"^(true|false|0|1)$";
pub(crate) const CREDIT_CARD: &str = r"^(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|6(?:011|5[0-9]{2})[0-9]{12}|3[47][0-9]{13}|3(?:0[0-5]|[68][0-9])[0-9]{11}|(?:2131|1800|35[0-9]{3})[0-9]{11})$";
pub(crate) const EMAIL: &str = r"^[\w.%+'-]+@(?:[\p{L}\p{Nd}-]+\.)+\p{L}{2,}$";
pub(crate) const IBAN: &str = r"^[a-z]{2}\d{2}\s?([0-9a-z]{4}\s?){2,7}[0-9a-z]{1,4}$";
pub(crate) const PHONE: &str = r"^(\+?1[\s.-]?)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}$";
pub(crate) const TIME: &str = r"^([01]?\d|2[0-3]):[0-5]\d(:[0-5]\d)?$";
pub(crate) const URL: &str = r"^(https?|ftp)://[^\s/$.?#][^\s]*$";

pub(crate) const INTEGER: &str = r"^\d+$";
pub(crate) const INTEGER_SIGNED: &str = r"^[-+]?\d+$";
pub(crate) const FLOAT: &str = r"^\d*\.\d+$";
pub(crate) const FLOAT_SIGNED: &str = r"^[-+]?\d*\.\d+$";
pub(crate) const NUMERIC: &str = r"^\d*\.?\d+$";
pub(crate) const NUMERIC_SIGNED: &str = r"^[-+]?\d*\.?\d+$";

pub(crate) const IPV4: &str = r"^((25[0-5]|2[0-4]\d|[01]?\d\d?)\.){3}(25[0-5]|2[0-4]\d|[01]?\d\d?)$";
pub(crate) const IPV6: &str = concat!(
    r"^(([0-9a-f]{1,4}:){7}[0-9a-f]{1,4}",
    r"|([0-9a-f]{1,4}:){1,7}:",
    r"|([0-9a-f]{1,4}:){1,6}:[0-9a-f]{1,4}",
    r"|([0-9a-f]{1,4}:){1,5}(:[0-9a-f]{1,4}){1,2}",
    r"|([0-9a-f]{1,4}:){1,4}(:[0-9a-f]{1,4}){1,3}",
    r"|([0-9a-f]{1,4}:){1,3}(:[0-9a-f]{1,4}){1,4}",
    r"|([0-9a-f]{1,4}:){1,2}(:[0-9a-f]{1,4}){1,5}",
    r"|[0-9a-f]{1,4}:(:[0-9a-f]{1,4}){1,6}",
    r"|:((:[0-9a-f]{1,4}){1,7}|:))$"
);
