/* Lifecycle hook seams for compiled messages */

use std::fmt;

use crate::value::MessageValue;

/// An installed lifecycle callable. At most one override exists per seam,
/// so a boxed closure is all the dispatch a message needs.
pub type Hook = Box<dyn Fn(&mut MessageValue) + Send + Sync>;

/// The two extension points of one message: invoked before its fields are
/// encoded and after a decode completes. Both default to no-ops; the set
/// only exists at all when the message's triggers option compiled the
/// seams in.
#[derive(Default)]
pub struct HookSet {
    pub pre_encode: Option<Hook>,
    pub post_decode: Option<Hook>,
}

impl HookSet {
    pub fn run_pre_encode(&self, instance: &mut MessageValue) {
        if let Some(hook) = &self.pre_encode {
            hook(instance);
        }
    }

    pub fn run_post_decode(&self, instance: &mut MessageValue) {
        if let Some(hook) = &self.post_decode {
            hook(instance);
        }
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("pre_encode", &self.pre_encode.is_some())
            .field("post_decode", &self.post_decode.is_some())
            .finish()
    }
}
