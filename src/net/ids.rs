//! 编译后网络使用的强类型索引：库所、迁移以及可见动作标签。
use std::fmt;

use crate::net::index_vec::Idx;

macro_rules! define_index {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl Idx for $name {
            fn index(self) -> usize {
                self.0 as usize
            }

            fn from_usize(idx: usize) -> Self {
                debug_assert!(idx <= u32::MAX as usize);
                Self(idx as u32)
            }
        }
    };
}

define_index!(
    /// 库所在编译网中的位置（声明库所在前，隐式库所在后）。
    PlaceId,
    "p"
);
define_index!(
    /// 迁移在编译网中的位置，与模型中的声明顺序一致。
    TransitionId,
    "t"
);
define_index!(
    /// Interned visible action shared by the parent and child graphs.
    LabelId,
    "a"
);
