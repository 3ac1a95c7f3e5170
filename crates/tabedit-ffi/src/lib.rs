//! C FFI bindings for tabedit-core
//!
//! This crate provides a C-compatible API over an editing session, so a
//! native grid UI can load a file, edit cells and export the result.
//! Status-returning functions yield `TE_OK` or a negative `TE_ERR_*` code.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use tabedit_core::{EditError, EditSession, Error, ParseError, TableModel};

pub const TE_OK: i32 = 0;
pub const TE_ERR_NULL: i32 = -1;
pub const TE_ERR_UTF8: i32 = -2;
pub const TE_ERR_NO_TABLE: i32 = -3;
pub const TE_ERR_EMPTY_INPUT: i32 = -10;
pub const TE_ERR_DUPLICATE_HEADER: i32 = -11;
pub const TE_ERR_MALFORMED_ROW: i32 = -12;
pub const TE_ERR_UNTERMINATED_QUOTE: i32 = -13;
pub const TE_ERR_ROW_OUT_OF_RANGE: i32 = -20;
pub const TE_ERR_UNKNOWN_COLUMN: i32 = -21;
pub const TE_ERR_DUPLICATE_COLUMN: i32 = -22;
pub const TE_ERR_LAST_COLUMN: i32 = -23;
pub const TE_ERR_OTHER: i32 = -99;

/// Opaque handle to an editing session
pub struct FfiSession {
    inner: EditSession,
}

fn parse_code(e: &ParseError) -> i32 {
    match e {
        ParseError::EmptyInput => TE_ERR_EMPTY_INPUT,
        ParseError::DuplicateHeader(_) => TE_ERR_DUPLICATE_HEADER,
        ParseError::MalformedRow { .. } => TE_ERR_MALFORMED_ROW,
        ParseError::UnterminatedQuote { .. } => TE_ERR_UNTERMINATED_QUOTE,
    }
}

fn edit_code(e: &EditError) -> i32 {
    match e {
        EditError::RowOutOfRange { .. } => TE_ERR_ROW_OUT_OF_RANGE,
        EditError::UnknownColumn(_) => TE_ERR_UNKNOWN_COLUMN,
        EditError::DuplicateColumn(_) => TE_ERR_DUPLICATE_COLUMN,
        EditError::LastColumn => TE_ERR_LAST_COLUMN,
    }
}

fn error_code(e: &Error) -> i32 {
    match e {
        Error::Parse(e) => parse_code(e),
        Error::Edit(e) | Error::Script { source: e, .. } => edit_code(e),
        Error::InvalidUtf8(_) => TE_ERR_UTF8,
        Error::NoTableLoaded => TE_ERR_NO_TABLE,
        _ => TE_ERR_OTHER,
    }
}

fn status(result: Result<(), EditError>) -> i32 {
    match result {
        Ok(()) => TE_OK,
        Err(e) => edit_code(&e),
    }
}

/// Borrow a C string as UTF-8
unsafe fn str_arg<'a>(s: *const c_char) -> Result<&'a str, i32> {
    if s.is_null() {
        return Err(TE_ERR_NULL);
    }
    CStr::from_ptr(s).to_str().map_err(|_| TE_ERR_UTF8)
}

unsafe fn model<'a>(session: *const FfiSession) -> Result<&'a TableModel, i32> {
    if session.is_null() {
        return Err(TE_ERR_NULL);
    }
    (*session).inner.model().map_err(|e| error_code(&e))
}

unsafe fn model_mut<'a>(session: *mut FfiSession) -> Result<&'a mut TableModel, i32> {
    if session.is_null() {
        return Err(TE_ERR_NULL);
    }
    (*session).inner.model_mut().map_err(|e| error_code(&e))
}

fn into_c_string(s: &str) -> *mut c_char {
    CString::new(s)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Hand a byte buffer to C, storing its length in `out_len`
unsafe fn into_c_bytes(bytes: Vec<u8>, out_len: *mut usize) -> *mut u8 {
    let bytes = bytes.into_boxed_slice();
    *out_len = bytes.len();
    Box::into_raw(bytes) as *mut u8
}

/// Create a session with the default dialect
#[no_mangle]
pub extern "C" fn te_session_new() -> *mut FfiSession {
    Box::into_raw(Box::new(FfiSession {
        inner: EditSession::default(),
    }))
}

/// Free a session
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new` or null
#[no_mangle]
pub unsafe extern "C" fn te_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

/// Load raw file contents, replacing any loaded table
///
/// On failure the previous table stays loaded.
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `data` must point to `len` readable bytes
/// - `file_name` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn te_session_load(
    session: *mut FfiSession,
    data: *const u8,
    len: usize,
    file_name: *const c_char,
) -> i32 {
    if session.is_null() || (data.is_null() && len > 0) {
        return TE_ERR_NULL;
    }
    let name = match str_arg(file_name) {
        Ok(name) => name,
        Err(code) => return code,
    };
    let bytes: &[u8] = if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(data, len)
    };

    match (*session).inner.load(bytes, name) {
        Ok(_) => TE_OK,
        Err(e) => error_code(&e),
    }
}

/// Discard the loaded table
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
#[no_mangle]
pub unsafe extern "C" fn te_session_close(session: *mut FfiSession) {
    if !session.is_null() {
        (*session).inner.close();
    }
}

/// Get the number of rows, 0 when nothing is loaded
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
#[no_mangle]
pub unsafe extern "C" fn te_row_count(session: *const FfiSession) -> usize {
    model(session).map(|m| m.row_count()).unwrap_or(0)
}

/// Get the number of columns, 0 when nothing is loaded
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
#[no_mangle]
pub unsafe extern "C" fn te_column_count(session: *const FfiSession) -> usize {
    model(session).map(|m| m.column_count()).unwrap_or(0)
}

/// Get a column name by index
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `te_free_string`
#[no_mangle]
pub unsafe extern "C" fn te_column_name(session: *const FfiSession, index: usize) -> *mut c_char {
    model(session)
        .ok()
        .and_then(|m| m.table().header().names().get(index))
        .map(|name| into_c_string(name))
        .unwrap_or(ptr::null_mut())
}

/// Get a cell value by row index and column name
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `column` must be a valid C string
/// - Returns null if the row or column does not exist, or if the value
///   contains a NUL byte; use `te_cell_bytes` for such values
/// - Caller must free the returned string with `te_free_string`
#[no_mangle]
pub unsafe extern "C" fn te_cell(
    session: *const FfiSession,
    row: usize,
    column: *const c_char,
) -> *mut c_char {
    let column = match str_arg(column) {
        Ok(c) => c,
        Err(_) => return ptr::null_mut(),
    };

    model(session)
        .ok()
        .and_then(|m| m.cell(row, column).ok())
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// Get a cell value as a length-delimited UTF-8 buffer
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `column` must be a valid C string
/// - `out_len` must be a valid pointer; it receives the buffer length
/// - Returns null only if the row or column does not exist
/// - Caller must free the returned buffer with `te_free_bytes`
#[no_mangle]
pub unsafe extern "C" fn te_cell_bytes(
    session: *const FfiSession,
    row: usize,
    column: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    if out_len.is_null() {
        return ptr::null_mut();
    }
    let column = match str_arg(column) {
        Ok(c) => c,
        Err(_) => return ptr::null_mut(),
    };

    match model(session).ok().and_then(|m| m.cell(row, column).ok()) {
        Some(value) => into_c_bytes(value.as_bytes().to_vec(), out_len),
        None => ptr::null_mut(),
    }
}

/// Replace one cell
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `column` and `value` must be valid C strings
#[no_mangle]
pub unsafe extern "C" fn te_set_cell(
    session: *mut FfiSession,
    row: usize,
    column: *const c_char,
    value: *const c_char,
) -> i32 {
    let (column, value) = match (str_arg(column), str_arg(value)) {
        (Ok(c), Ok(v)) => (c, v),
        (Err(code), _) | (_, Err(code)) => return code,
    };

    match model_mut(session) {
        Ok(m) => status(m.set_cell(row, column, value)),
        Err(code) => code,
    }
}

/// Append an empty row; returns its index, or a negative status
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
#[no_mangle]
pub unsafe extern "C" fn te_add_row(session: *mut FfiSession) -> i64 {
    match model_mut(session) {
        Ok(m) => m.add_row() as i64,
        Err(code) => code as i64,
    }
}

/// Delete a row; later rows shift down by one
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
#[no_mangle]
pub unsafe extern "C" fn te_delete_row(session: *mut FfiSession, row: usize) -> i32 {
    match model_mut(session) {
        Ok(m) => status(m.delete_row(row)),
        Err(code) => code,
    }
}

/// Append a column with empty values
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `name` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn te_add_column(session: *mut FfiSession, name: *const c_char) -> i32 {
    let name = match str_arg(name) {
        Ok(n) => n,
        Err(code) => return code,
    };

    match model_mut(session) {
        Ok(m) => status(m.add_column(name).map(|_| ())),
        Err(code) => code,
    }
}

/// Remove a column from the header and every row
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `name` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn te_remove_column(session: *mut FfiSession, name: *const c_char) -> i32 {
    let name = match str_arg(name) {
        Ok(n) => n,
        Err(code) => return code,
    };

    match model_mut(session) {
        Ok(m) => status(m.remove_column(name)),
        Err(code) => code,
    }
}

/// Serialize the current table
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - Returns null if nothing is loaded or the text contains a NUL byte;
///   use `te_export_bytes` for such tables
/// - Caller must free the returned string with `te_free_string`
#[no_mangle]
pub unsafe extern "C" fn te_export(session: *const FfiSession) -> *mut c_char {
    if session.is_null() {
        return ptr::null_mut();
    }

    (*session)
        .inner
        .export()
        .ok()
        .and_then(|export| CString::new(export.bytes).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Serialize the current table into a length-delimited UTF-8 buffer
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - `out_len` must be a valid pointer; it receives the buffer length
/// - Returns null only if nothing is loaded
/// - Caller must free the returned buffer with `te_free_bytes`
#[no_mangle]
pub unsafe extern "C" fn te_export_bytes(
    session: *const FfiSession,
    out_len: *mut usize,
) -> *mut u8 {
    if session.is_null() || out_len.is_null() {
        return ptr::null_mut();
    }

    match (*session).inner.export() {
        Ok(export) => into_c_bytes(export.bytes, out_len),
        Err(_) => ptr::null_mut(),
    }
}

/// Suggested file name for exports
///
/// # Safety
/// - `session` must be a valid pointer returned by `te_session_new`
/// - Caller must free the returned string with `te_free_string`
#[no_mangle]
pub unsafe extern "C" fn te_export_file_name(session: *const FfiSession) -> *mut c_char {
    if session.is_null() {
        return ptr::null_mut();
    }
    into_c_string(&(*session).inner.config().export_file_name)
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a te_* function or null
#[no_mangle]
pub unsafe extern "C" fn te_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Free a buffer returned by `te_cell_bytes` or `te_export_bytes`
///
/// # Safety
/// - `bytes` must be a pointer returned by one of those functions or null
/// - `len` must be the length reported alongside it
#[no_mangle]
pub unsafe extern "C" fn te_free_bytes(bytes: *mut u8, len: usize) {
    if !bytes.is_null() {
        drop(Box::from_raw(ptr::slice_from_raw_parts_mut(bytes, len)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take_string(s: *mut c_char) -> Option<String> {
        if s.is_null() {
            return None;
        }
        let owned = CStr::from_ptr(s).to_string_lossy().into_owned();
        te_free_string(s);
        Some(owned)
    }

    unsafe fn take_bytes(bytes: *mut u8, len: usize) -> Option<Vec<u8>> {
        if bytes.is_null() {
            return None;
        }
        let owned = std::slice::from_raw_parts(bytes, len).to_vec();
        te_free_bytes(bytes, len);
        Some(owned)
    }

    #[test]
    fn test_session_round_trip() {
        unsafe {
            let session = te_session_new();
            let data = b"name,note\nAda,x\n";
            let name = CString::new("people.csv").unwrap();

            assert_eq!(te_session_load(session, data.as_ptr(), data.len(), name.as_ptr()), TE_OK);
            assert_eq!(te_row_count(session), 1);
            assert_eq!(te_column_count(session), 2);
            assert_eq!(take_string(te_column_name(session, 1)).as_deref(), Some("note"));

            let col = CString::new("note").unwrap();
            let value = CString::new("hi, there").unwrap();
            assert_eq!(te_set_cell(session, 0, col.as_ptr(), value.as_ptr()), TE_OK);
            assert_eq!(te_add_row(session), 1);

            assert_eq!(
                take_string(te_cell(session, 0, col.as_ptr())).as_deref(),
                Some("hi, there")
            );
            assert_eq!(
                take_string(te_export(session)).as_deref(),
                Some("name,note\nAda,\"hi, there\"\n,")
            );
            assert_eq!(
                take_string(te_export_file_name(session)).as_deref(),
                Some("edited_data.csv")
            );

            te_session_free(session);
        }
    }

    #[test]
    fn test_error_codes() {
        unsafe {
            let session = te_session_new();
            let name = CString::new("t.csv").unwrap();
            let col = CString::new("a").unwrap();

            assert_eq!(te_add_row(session), TE_ERR_NO_TABLE as i64);

            let dup = b"a,a\n1,2";
            assert_eq!(
                te_session_load(session, dup.as_ptr(), dup.len(), name.as_ptr()),
                TE_ERR_DUPLICATE_HEADER
            );

            let long = b"a,b\n1,2\n3,4,5";
            assert_eq!(
                te_session_load(session, long.as_ptr(), long.len(), name.as_ptr()),
                TE_ERR_MALFORMED_ROW
            );

            let good = b"a\n1";
            assert_eq!(
                te_session_load(session, good.as_ptr(), good.len(), name.as_ptr()),
                TE_OK
            );
            assert_eq!(te_delete_row(session, 3), TE_ERR_ROW_OUT_OF_RANGE);
            assert_eq!(te_remove_column(session, col.as_ptr()), TE_ERR_LAST_COLUMN);
            assert_eq!(te_add_column(session, col.as_ptr()), TE_ERR_DUPLICATE_COLUMN);

            let missing = CString::new("zzz").unwrap();
            assert_eq!(
                te_set_cell(session, 0, missing.as_ptr(), col.as_ptr()),
                TE_ERR_UNKNOWN_COLUMN
            );
            assert_eq!(te_set_cell(session, 0, ptr::null(), col.as_ptr()), TE_ERR_NULL);

            te_session_close(session);
            assert_eq!(te_row_count(session), 0);
            assert!(te_export(session).is_null());

            te_session_free(session);
        }
    }

    #[test]
    fn test_bytes_carry_nul() {
        unsafe {
            let session = te_session_new();
            let name = CString::new("nul.csv").unwrap();
            let col = CString::new("b").unwrap();
            let mut len = 0usize;

            assert!(te_export_bytes(session, &mut len).is_null());

            let data = b"a,b\n1,x\0y";
            assert_eq!(te_session_load(session, data.as_ptr(), data.len(), name.as_ptr()), TE_OK);

            assert!(te_cell(session, 0, col.as_ptr()).is_null());
            let cell = te_cell_bytes(session, 0, col.as_ptr(), &mut len);
            assert_eq!(take_bytes(cell, len).as_deref(), Some(&b"x\0y"[..]));

            assert!(te_export(session).is_null());
            let export = te_export_bytes(session, &mut len);
            assert_eq!(take_bytes(export, len).as_deref(), Some(&data[..]));

            let missing = CString::new("zzz").unwrap();
            assert!(te_cell_bytes(session, 0, missing.as_ptr(), &mut len).is_null());

            te_session_free(session);
        }
    }
}
