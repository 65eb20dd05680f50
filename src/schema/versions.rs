//! Field tables of the registered layouts.
//!
//! Format strings as written by the passdb tdb backend:
//! ```text
//! V0  ddddddBBBBBBBBBBBBddBBwdwdBwwd
//! V1  dddddddBBBBBBBBBBBBddBBwdwdBwwd
//! V2  dddddddBBBBBBBBBBBBddBBBwwdBwwd
//! V3  dddddddBBBBBBBBBBBBddBBBdwdBwwd
//! ```

use super::{FieldDescriptor as F, Schema, SchemaVersion};
use crate::core::primitives::CodecKind::{Password, Pointer, String, Uint16, Uint32};

pub static PASSDB_V0: Schema = Schema::versioned("passdb-v0", SchemaVersion::V0, V0_FIELDS);
pub static PASSDB_V1: Schema = Schema::versioned("passdb-v1", SchemaVersion::V1, V1_FIELDS);
pub static PASSDB_V2: Schema = Schema::versioned("passdb-v2", SchemaVersion::V2, V2_FIELDS);
pub static PASSDB_V3: Schema = Schema::versioned("passdb-v3", SchemaVersion::V3, V3_FIELDS);

const V0_FIELDS: &[F] = &[
    F::new("logon_time", Uint32),
    F::new("logoff_time", Uint32),
    F::new("kickoff_time", Uint32),
    F::new("pass_last_set_time", Uint32),
    F::new("pass_can_change_time", Uint32),
    F::new("pass_must_change_time", Uint32),
    F::new("username", String),
    F::new("domain", String),
    F::new("nt_username", String),
    F::new("fullname", String),
    F::new("homedir", String),
    F::new("dir_drive", String),
    F::new("logon_script", String),
    F::new("profile_path", String),
    F::new("acct_desc", String),
    F::new("workstations", String),
    F::new("unknown_str", String),
    F::new("munged_dial", String),
    F::new("user_rid", Uint32),
    F::new("group_rid", Uint32),
    F::new("lm_pw", Password),
    F::new("nt_pw", Password),
    F::new("acct_ctrl", Uint16),
    // dropped in V2
    F::new("remove_me", Uint32),
    F::new("logon_divs", Uint16),
    F::new("hours_len", Uint32),
    F::new("hours", Pointer),
    F::new("bad_password_count", Uint16),
    F::new("logon_count", Uint16),
    F::new("unknown_6", Uint32),
];

const V1_FIELDS: &[F] = &[
    F::new("logon_time", Uint32),
    F::new("logoff_time", Uint32),
    F::new("kickoff_time", Uint32),
    F::new("bad_password_time", Uint32),
    F::new("pass_last_set_time", Uint32),
    F::new("pass_can_change_time", Uint32),
    F::new("pass_must_change_time", Uint32),
    F::new("username", String),
    F::new("domain", String),
    F::new("nt_username", String),
    F::new("fullname", String),
    F::new("homedir", String),
    F::new("dir_drive", String),
    F::new("logon_script", String),
    F::new("profile_path", String),
    F::new("acct_desc", String),
    F::new("workstations", String),
    F::new("unknown_str", String),
    F::new("munged_dial", String),
    F::new("user_rid", Uint32),
    F::new("group_rid", Uint32),
    F::new("lm_pw", Password),
    F::new("nt_pw", Password),
    F::new("acct_ctrl", Uint16),
    F::new("remove_me", Uint32),
    F::new("logon_divs", Uint16),
    F::new("hours_len", Uint32),
    F::new("hours", Pointer),
    F::new("bad_password_count", Uint16),
    F::new("logon_count", Uint16),
    F::new("unknown_6", Uint32),
];

const V2_FIELDS: &[F] = &[
    F::new("logon_time", Uint32),
    F::new("logoff_time", Uint32),
    F::new("kickoff_time", Uint32),
    F::new("bad_password_time", Uint32),
    F::new("pass_last_set_time", Uint32),
    F::new("pass_can_change_time", Uint32),
    F::new("pass_must_change_time", Uint32),
    F::new("username", String),
    F::new("domain", String),
    F::new("nt_username", String),
    F::new("fullname", String),
    F::new("homedir", String),
    F::new("dir_drive", String),
    F::new("logon_script", String),
    F::new("profile_path", String),
    F::new("acct_desc", String),
    F::new("workstations", String),
    F::new("unknown_str", String),
    F::new("munged_dial", String),
    F::new("user_rid", Uint32),
    F::new("group_rid", Uint32),
    F::new("lm_pw", Password),
    F::new("nt_pw", Password),
    F::new("nt_pw_hist", Pointer),
    F::new("acct_ctrl", Uint16),
    F::new("logon_divs", Uint16),
    F::new("hours_len", Uint32),
    F::new("hours", Pointer),
    F::new("bad_password_count", Uint16),
    F::new("logon_count", Uint16),
    F::new("unknown_6", Uint32),
];

const V3_FIELDS: &[F] = &[
    F::new("logon_time", Uint32),
    F::new("logoff_time", Uint32),
    F::new("kickoff_time", Uint32),
    F::new("bad_password_time", Uint32),
    F::new("pass_last_set_time", Uint32),
    F::new("pass_can_change_time", Uint32),
    F::new("pass_must_change_time", Uint32),
    F::new("username", String),
    F::new("domain", String),
    F::new("nt_username", String),
    F::new("fullname", String),
    F::new("homedir", String),
    F::new("dir_drive", String),
    F::new("logon_script", String),
    F::new("profile_path", String),
    F::new("acct_desc", String),
    F::new("workstations", String),
    F::new("comment", String),
    F::new("munged_dial", String),
    F::new("user_rid", Uint32),
    F::new("group_rid", Uint32),
    F::new("lm_pw", Password),
    F::new("nt_pw", Password),
    F::new("nt_pw_hist", Pointer),
    F::new("acct_ctrl", Uint32),
    F::new("logon_divs", Uint16),
    F::new("hours_len", Uint32),
    F::new("hours", Pointer),
    F::new("bad_password_count", Uint16),
    F::new("logon_count", Uint16),
    F::new("unknown_6", Uint32),
];

/// Attribute names used by the tdb backend's own attribute map, keyed to the
/// field names of this crate. Lookups by name accept either spelling.
pub const HISTORICAL_NAMES: &[(&str, &str)] = &[
    ("lm_pw_ptr", "lm_pw"),
    ("nt_pw_ptr", "nt_pw"),
    ("nt_history", "nt_pw_hist"),
    ("bad_Password_count", "bad_password_count"),
    ("bad_Password_time", "bad_password_time"),
];

/// Resolve a historical attribute name to its field name.
pub fn canonical_name(name: &str) -> &str {
    HISTORICAL_NAMES
        .iter()
        .find(|(old, _)| *old == name)
        .map_or(name, |&(_, new)| new)
}

/// Account-control bits stored in `acct_ctrl`.
pub mod acct_flags {
    pub const ACB_DISABLED: u32 = 0x0000_0001;
    pub const ACB_HOMDIRREQ: u32 = 0x0000_0002;
    pub const ACB_PWNOTREQ: u32 = 0x0000_0004;
    pub const ACB_TEMPDUP: u32 = 0x0000_0008;
    pub const ACB_NORMAL: u32 = 0x0000_0010;
    pub const ACB_MNS: u32 = 0x0000_0020;
    pub const ACB_DOMTRUST: u32 = 0x0000_0040;
    pub const ACB_WSTRUST: u32 = 0x0000_0080;
    pub const ACB_SVRTRUST: u32 = 0x0000_0100;
    pub const ACB_PWNOEXP: u32 = 0x0000_0200;
    pub const ACB_AUTOLOCK: u32 = 0x0000_0400;
    // Only representable from V3 on.
    pub const ACB_ENC_TXT_PWD_ALLOWED: u32 = 0x0000_0800;
    pub const ACB_SMARTCARD_REQUIRED: u32 = 0x0000_1000;
    pub const ACB_TRUSTED_FOR_DELEGATION: u32 = 0x0000_2000;
    pub const ACB_NOT_DELEGATED: u32 = 0x0000_4000;
    pub const ACB_USE_DES_KEY_ONLY: u32 = 0x0000_8000;
    pub const ACB_DONT_REQUIRE_PREAUTH: u32 = 0x0001_0000;
    pub const ACB_PW_EXPIRED: u32 = 0x0002_0000;
}
