//! The reference object model the builtins operate on.
//!
//! Values are reference counted with `Rc`; containers that must be observed through several
//! handles (dicts, cells, lists) use `RefCell` for shared mutation.

pub(crate) mod class;
pub(crate) mod dict;
pub(crate) mod function;
pub(crate) mod iter;
pub(crate) mod metaclass;
pub(crate) mod module;
pub(crate) mod number;
pub(crate) mod r#type;

pub use class::{BoundMethod, ClassObject, Instance, MAX_MRO_LENGTH, TypeRef};
pub use dict::Dict;
pub use function::{Cell, Code, Function};
pub use iter::{NextResult, PyIter};
pub use module::Module;
pub use r#type::Type;
