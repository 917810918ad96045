// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android message store via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Queries go through
// `Context.getContentResolver().query(content://sms/<partition>, ...)` on
// the ART runtime; the returned `android.database.Cursor` is wrapped in an
// `AndroidCursor` that closes it on drop.
//
// The host Activity must already hold `android.permission.READ_SMS`. A
// `SecurityException` from the resolver is reported as `StoreUnavailable`
// like any other query failure.

#![cfg(target_os = "android")]

use jni::objects::{GlobalRef, JObject, JObjectArray, JString, JValue};
use jni::sys::jsize;
use jni::{JNIEnv, JavaVM};

use smsbridge_core::error::{Result, SmsBridgeError};
use tracing::{debug, instrument};

use crate::traits::{Cursor, ExecutionContext, StoreQuery};

/// Authority + scheme of the SMS content provider.
const SMS_CONTENT_URI: &str = "content://sms";

/// Describe and clear any pending Java exception, then format the error.
///
/// A pending exception poisons every later JNI call on this thread, so it is
/// cleared before the error is returned.
fn jni_err(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> String {
    if matches!(e, jni::errors::Error::JavaException) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
    format!("{context}: {e}")
}

/// Query-time JNI failure: the store could not be reached.
fn unavailable(env: &mut JNIEnv<'_>, context: &str, e: jni::errors::Error) -> SmsBridgeError {
    SmsBridgeError::StoreUnavailable(jni_err(env, context, e))
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Android execution context: the process `JavaVM` plus a global reference
/// to the hosting `Context`.
pub struct AndroidContext {
    vm: JavaVM,
    context: GlobalRef,
}

impl AndroidContext {
    /// Build a context from the pointers published by the NDK glue.
    ///
    /// `ndk_context::android_context()` yields the `JavaVM*` and the
    /// `jobject` of the hosting Activity. The Activity is pinned with a
    /// global reference so the context can be used from any thread.
    pub fn from_ndk() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
        // The pointer is valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| SmsBridgeError::Bridge(format!("failed to obtain JavaVM: {e}")))?;

        let ptr = ctx.context();
        if ptr.is_null() {
            return Err(SmsBridgeError::Bridge(
                "Android context is null: native activity not initialised".into(),
            ));
        }

        let context = {
            let env = vm
                .attach_current_thread_permanently()
                .map_err(|e| SmsBridgeError::Bridge(format!("failed to attach JNI thread: {e}")))?;
            // SAFETY: the NDK guarantees this pointer is a valid jobject for
            // the hosting Activity.
            let activity = unsafe { JObject::from_raw(ptr.cast()) };
            env.new_global_ref(&activity)
                .map_err(|e| SmsBridgeError::Bridge(format!("new_global_ref(context): {e}")))?
        };

        Ok(Self { vm, context })
    }
}

impl ExecutionContext for AndroidContext {
    #[instrument(skip_all, fields(partition = query.partition))]
    fn query(&self, query: &StoreQuery) -> Result<Option<Box<dyn Cursor + '_>>> {
        let mut env = self
            .vm
            .attach_current_thread_permanently()
            .map_err(|e| SmsBridgeError::StoreUnavailable(format!("attach JNI thread: {e}")))?;

        // Every intermediate local ref is wrapped in `AutoLocal` and freed on
        // scope exit; the thread stays attached, so nothing else frees them.

        // -- ContentResolver resolver = context.getContentResolver() ----------
        let resolver: JObject = env
            .call_method(
                self.context.as_obj(),
                "getContentResolver",
                "()Landroid/content/ContentResolver;",
                &[],
            )
            .and_then(|v| v.l())
            .map_err(|e| unavailable(&mut env, "getContentResolver", e))?;
        let resolver = env.auto_local(resolver);

        // -- Uri uri = Uri.parse("content://sms/<partition>") ------------------
        let j_uri_str: JString = env
            .new_string(format!("{SMS_CONTENT_URI}/{}", query.partition))
            .map_err(|e| unavailable(&mut env, "new_string(uri)", e))?;
        let j_uri_str = env.auto_local(j_uri_str);

        let uri: JObject = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&*j_uri_str)],
            )
            .and_then(|v| v.l())
            .map_err(|e| unavailable(&mut env, "Uri.parse", e))?;
        let uri = env.auto_local(uri);

        // -- String[] projection ----------------------------------------------
        let projection = env
            .new_object_array(
                query.projection.len() as jsize,
                "java/lang/String",
                JObject::null(),
            )
            .map_err(|e| unavailable(&mut env, "new_object_array(projection)", e))?;
        let projection = env.auto_local(projection);

        for (index, column) in query.projection.iter().enumerate() {
            let j_column = env
                .new_string(column)
                .map_err(|e| unavailable(&mut env, "new_string(column)", e))?;
            let j_column = env.auto_local(j_column);
            env.set_object_array_element(&*projection, index as jsize, &*j_column)
                .map_err(|e| unavailable(&mut env, "set_object_array_element", e))?;
        }

        let j_sort: JString = env
            .new_string(query.sort_order.clause())
            .map_err(|e| unavailable(&mut env, "new_string(sort_order)", e))?;
        let j_sort = env.auto_local(j_sort);

        // -- resolver.query(uri, projection, null, null, sortOrder) -----------
        let cursor: JObject = env
            .call_method(
                &*resolver,
                "query",
                "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                &[
                    JValue::Object(&*uri),
                    JValue::Object(&*projection),
                    JValue::Object(&JObject::null()),
                    JValue::Object(&JObject::null()),
                    JValue::Object(&*j_sort),
                ],
            )
            .and_then(|v| v.l())
            .map_err(|e| unavailable(&mut env, "ContentResolver.query", e))?;

        if cursor.is_null() {
            debug!("ContentResolver returned a null cursor");
            return Ok(None);
        }

        let mut android_cursor = AndroidCursor {
            env,
            cursor,
            columns: Vec::new(),
        };
        // Any failure from here on drops `android_cursor`, which closes it.
        android_cursor.columns = android_cursor.column_names()?;
        debug!(columns = ?android_cursor.columns, "Android cursor opened");

        Ok(Some(Box::new(android_cursor)))
    }

    fn describe(&self) -> String {
        "Android".into()
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Wrapper around an `android.database.Cursor` local reference.
struct AndroidCursor<'a> {
    env: JNIEnv<'a>,
    cursor: JObject<'a>,
    /// Column names in cursor order, read once via `getColumnNames()`.
    columns: Vec<String>,
}

impl AndroidCursor<'_> {
    fn cursor_err(&mut self, context: &str, e: jni::errors::Error) -> SmsBridgeError {
        SmsBridgeError::Cursor(jni_err(&mut self.env, context, e))
    }

    fn column_names(&mut self) -> Result<Vec<String>> {
        let names = self
            .env
            .call_method(&self.cursor, "getColumnNames", "()[Ljava/lang/String;", &[])
            .and_then(|v| v.l())
            .map_err(|e| self.cursor_err("getColumnNames", e))?;
        let names = self.env.auto_local(JObjectArray::from(names));

        let len = self
            .env
            .get_array_length(&*names)
            .map_err(|e| self.cursor_err("get_array_length", e))?;

        let mut columns = Vec::with_capacity(len as usize);
        for index in 0..len {
            let element = self
                .env
                .get_object_array_element(&*names, index)
                .map_err(|e| self.cursor_err("get_object_array_element", e))?;
            let element = self.env.auto_local(JString::from(element));
            let name: String = self
                .env
                .get_string(&element)
                .map_err(|e| self.cursor_err("get_string(column name)", e))?
                .into();
            columns.push(name);
        }
        Ok(columns)
    }
}

impl Cursor for AndroidCursor<'_> {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn move_to_next(&mut self) -> Result<bool> {
        self.env
            .call_method(&self.cursor, "moveToNext", "()Z", &[])
            .and_then(|v| v.z())
            .map_err(|e| self.cursor_err("Cursor.moveToNext", e))
    }

    fn get_string(&mut self, column: usize) -> Result<Option<String>> {
        let value = self
            .env
            .call_method(
                &self.cursor,
                "getString",
                "(I)Ljava/lang/String;",
                &[JValue::Int(column as i32)],
            )
            .and_then(|v| v.l())
            .map_err(|e| self.cursor_err("Cursor.getString", e))?;

        if value.is_null() {
            return Ok(None);
        }

        // One local ref per cell, released when `value` drops.
        let value = self.env.auto_local(JString::from(value));
        let text: String = self
            .env
            .get_string(&value)
            .map_err(|e| self.cursor_err("get_string(value)", e))?
            .into();
        Ok(Some(text))
    }
}

impl Drop for AndroidCursor<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.env.call_method(&self.cursor, "close", "()V", &[]) {
            let message = jni_err(&mut self.env, "Cursor.close", e);
            tracing::warn!(error = %message, "failed to close Android cursor");
        }
        let cursor = std::mem::replace(&mut self.cursor, JObject::null());
        let _ = self.env.delete_local_ref(cursor);
    }
}
