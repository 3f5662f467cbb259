//! # Petri 网核心定义（Place/Transition Net）
//!
//! 数据模型 [`PetriNet`] 由外部加载器给出：库所 `(id, tokens)`、迁移 `id`
//! 以及带权弧 `(sourceId, destinationId, multiplicity)`。分析前先编译为
//! [`Net`]：库所与迁移改用强类型索引，每个迁移持有稀疏的输入/输出弧表。
//!
//! * 迁移 `t` **可发生** 当且仅当对每条输入弧 `(p, t, w)` 有 `M[p] ≥ w`；
//! * 迁移 **发射** 后 `M'[p] = M[p] - Pre[p, t] + Post[p, t]`；
//! * 弧端点若不是已声明的库所，则视为初始 token 为 0 的隐式库所。
//!
//! ## 示例
//!
//! ```rust
//! use pn_inherit::net::*;
//!
//! let model = PetriNet::new()
//!     .with_place("p0", 1)
//!     .with_place("p1", 0)
//!     .with_transition("t0")
//!     .with_arc("p0", "t0", 1)
//!     .with_arc("t0", "p1", 1);
//! let net = Net::from_model(&model, ArcPolicy::Lenient).unwrap();
//!
//! let marking = net.initial_marking();
//! let t0 = net.enabled_transitions(&marking)[0];
//! let next = net.fire_transition(&marking, t0).unwrap();
//! assert_eq!(next.total(), 1);
//! assert_ne!(next, marking);
//! ```

pub mod core;
pub mod ids;
pub mod incidence;
pub mod index_vec;
pub mod io;
pub mod structure;

pub use self::core::{ArcPolicy, CompiledPlace, FireError, Net};
pub use ids::{LabelId, PlaceId, TransitionId};
pub use incidence::Incidence;
pub use index_vec::{Idx, IndexVec};
pub use structure::{Arc, Marking, ModelError, PetriNet, Place, Transition, Weight};
