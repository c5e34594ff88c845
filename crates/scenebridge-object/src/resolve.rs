//! Path resolution over a live object graph.
//!
//! The resolver threads a [`Place`] through the steps of a
//! [`PathExpression`]:
//!
//! ```text
//! root ──member──► Holder(Component) ──member──► Member{value} ──map──► Member{value'}
//!   │                                                │
//!   └─transform:..─► Holder(Object parent)           └─ writes go back through
//!                                                       the owning property
//! ```
//!
//! A [`Holder`] is something with an accessor table (an object or one of
//! its components). Once a step reads a property the place becomes a
//! plain value; further member/map/index steps walk that JSON value while
//! remembering the owning property, so a write to `transform/position/x`
//! reads `position`, patches `x` and writes the whole vector back.
//!
//! # Optional Steps
//!
//! A miss at step *k* is silent (`Ok(None)`) when step *k* or any earlier
//! step carries `?`. Any other miss is [`ResolveError::Unresolved`].
//! Method failures count as misses.
//!
//! # Side Effects
//!
//! Resolution only reads, except for `method:` steps, which run the method.

use crate::path::{Arg, PathExpression, Step, StepKind, PARENT};
use crate::{AccessError, Accessible, ResolveError};
use scenebridge_event::value_kind;
use scenebridge_types::ObjectId;
use serde_json::Value;
use tracing::trace;

/// The object graph the resolver walks.
///
/// Implemented by the registry. Only live objects are visible.
pub trait ObjectGraph {
    /// Borrows a live object's root accessor.
    fn object(&self, id: &ObjectId) -> Option<&dyn Accessible>;

    /// Mutably borrows a live object's root accessor.
    fn object_mut(&mut self, id: &ObjectId) -> Option<&mut dyn Accessible>;

    /// Borrows a builtin or attached component of a live object.
    fn component(&self, id: &ObjectId, name: &str) -> Option<&dyn Accessible>;

    /// Mutably borrows a builtin or attached component of a live object.
    fn component_mut(&mut self, id: &ObjectId, name: &str) -> Option<&mut dyn Accessible>;

    /// Structural parent.
    fn parent(&self, id: &ObjectId) -> Option<ObjectId>;

    /// Child with the given `name` property.
    fn child_named(&self, id: &ObjectId, name: &str) -> Option<ObjectId>;
}

/// Something with an accessor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Holder {
    Object(ObjectId),
    Component(ObjectId, String),
}

impl Holder {
    /// The object this holder belongs to.
    #[must_use]
    pub fn object_id(&self) -> &ObjectId {
        match self {
            Self::Object(id) | Self::Component(id, _) => id,
        }
    }
}

/// Position inside a property's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Field(String),
    Index(usize),
}

/// Where a path ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    /// An object or component.
    Holder(Holder),
    /// A property value, or a part of it.
    Member {
        holder: Holder,
        member: String,
        keys: Vec<Key>,
        value: Value,
    },
    /// A value with no owner, such as a method result.
    Detached(Value),
}

impl Place {
    /// The object owning this place, if any.
    #[must_use]
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            Self::Holder(holder) | Self::Member { holder, .. } => Some(holder.object_id()),
            Self::Detached(_) => None,
        }
    }
}

/// Resolves `expr` starting at `root`.
///
/// Returns `Ok(Some(place))` on success and `Ok(None)` on an optional miss.
///
/// # Errors
///
/// [`ResolveError::Unresolved`] for a non-optional miss, including an
/// unregistered root.
pub fn resolve<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    expr: &PathExpression,
) -> Result<Option<Place>, ResolveError> {
    walk(graph, root, &expr.steps)
}

/// Resolves `expr` and reads the value there.
///
/// Objects and components read as a snapshot of all their properties.
///
/// # Errors
///
/// As [`resolve`].
pub fn get_value<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    expr: &PathExpression,
) -> Result<Option<Value>, ResolveError> {
    let Some(place) = resolve(graph, root, expr)? else {
        return Ok(None);
    };
    Ok(place_value(&*graph, place))
}

/// Writes `value` at `expr`.
///
/// A final `method:` step invokes instead: parenthesized arguments win,
/// otherwise an array value is passed positionally and any other value as
/// the single argument. A final `!` treats `value` as a path whose
/// resolved value is written.
///
/// Returns `Ok(false)` on an optional miss.
///
/// # Errors
///
/// Unresolved steps, conversion failures, or a target that cannot be
/// assigned (the root itself, a component, a method result).
pub fn set_value<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    expr: &PathExpression,
    value: &Value,
) -> Result<bool, ResolveError> {
    let Some((last, prefix)) = expr.steps.split_last() else {
        return Err(ResolveError::not_writable(
            "",
            "cannot assign to the object itself",
        ));
    };

    if matches!(last.kind, StepKind::Method { .. }) {
        let args = match value {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };
        return invoke(graph, root, expr, &args).map(|result| result.is_some());
    }

    let value = if last.evaluate {
        let Some(source) = value.as_str() else {
            return Err(ResolveError::Conversion {
                field: expr.to_string(),
                expected: "path string".to_string(),
                actual: value_kind(value).to_string(),
            });
        };
        let source = PathExpression::parse(source)?;
        match get_value(graph, root, &source)? {
            Some(resolved) => resolved,
            None => return Ok(false),
        }
    } else {
        value.clone()
    };

    let Some(place) = walk(graph, root, prefix)? else {
        return Ok(false);
    };
    let write = WriteTarget {
        expr,
        last,
        last_index: prefix.len(),
        optional: expr.has_optional(),
    };

    match place {
        Place::Holder(holder) => {
            let name = match &last.kind {
                StepKind::Member(name) | StepKind::Map(name) => name,
                _ => return Err(write.not_assignable()),
            };
            if matches!(last.kind, StepKind::Member(_))
                && matches!(holder, Holder::Object(_))
                && graph.component(holder.object_id(), name).is_some()
            {
                return Err(ResolveError::not_writable(
                    expr.to_string(),
                    format!("`{name}` is a component"),
                ));
            }
            let Some(target) = holder_mut(graph, &holder) else {
                return write.miss(format!("`{}` is not registered", holder.object_id()));
            };
            match target.set(name, &value) {
                Ok(()) => Ok(true),
                Err(err) => write.access_failed(err),
            }
        }
        Place::Member {
            holder,
            member,
            keys,
            ..
        } => {
            let Some(target) = holder_mut(graph, &holder) else {
                return write.miss(format!("`{}` is not registered", holder.object_id()));
            };
            let Some(mut whole) = target.get(&member) else {
                return write.miss(format!("{} has no member `{member}`", target.type_name()));
            };
            let Some(slot) = navigate_mut(&mut whole, &keys) else {
                return write.miss(format!("`{member}` changed shape during the write"));
            };
            match (slot, &last.kind) {
                (Value::Object(map), StepKind::Map(key)) => {
                    map.insert(key.clone(), value);
                }
                (Value::Object(map), StepKind::Member(key)) if map.contains_key(key) => {
                    map.insert(key.clone(), value);
                }
                (Value::Array(items), StepKind::Index(i)) => match normalize_index(*i, items.len()) {
                    Some(idx) => items[idx] = value,
                    None => return write.miss(format!("index {i} out of range")),
                },
                (other, _) => {
                    return write.miss(format!("cannot assign `{last}` inside {}", value_kind(other)));
                }
            }
            match target.set(&member, &whole) {
                Ok(()) => Ok(true),
                Err(err) => write.access_failed(err),
            }
        }
        Place::Detached(_) => Err(ResolveError::not_writable(
            expr.to_string(),
            "method results cannot be assigned",
        )),
    }
}

/// Invokes the method named by the final step of `expr`.
///
/// Parenthesized arguments in the path win over `args`. Returns `Ok(None)`
/// on an optional miss or an optional method failure.
///
/// # Errors
///
/// [`ResolveError::Unresolved`] when the path does not end in a method,
/// a step misses, or the method fails.
pub fn invoke<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    expr: &PathExpression,
    args: &[Value],
) -> Result<Option<Value>, ResolveError> {
    let Some((last, prefix)) = expr.steps.split_last() else {
        return Err(ResolveError::unresolved(0, "", "path does not name a method"));
    };
    let StepKind::Method {
        name,
        args: explicit,
    } = &last.kind
    else {
        return Err(ResolveError::unresolved(
            prefix.len(),
            last.to_string(),
            "last step is not a method",
        ));
    };
    let optional = expr.has_optional();
    let fail = |reason: String| -> Result<Option<Value>, ResolveError> {
        if optional {
            Ok(None)
        } else {
            Err(ResolveError::unresolved(prefix.len(), last.to_string(), reason))
        }
    };

    let Some(place) = walk(graph, root, prefix)? else {
        return Ok(None);
    };
    let Place::Holder(holder) = place else {
        return fail("methods can only be called on objects or components".to_string());
    };
    let call_args = match explicit {
        Some(explicit) => match evaluate_args(graph, root, explicit) {
            Ok(values) => values,
            Err(reason) => return fail(reason),
        },
        None => args.to_vec(),
    };
    let Some(target) = holder_mut(graph, &holder) else {
        return fail(format!("`{}` is not registered", holder.object_id()));
    };
    trace!(object = %root, method = %name, args = call_args.len(), "invoking method");
    match target.call(name, &call_args) {
        Ok(result) => Ok(Some(result)),
        Err(err) => {
            trace!(object = %root, method = %name, error = %err, optional, "method failed");
            fail(err.to_string())
        }
    }
}

/// Reads the value at an already-resolved place.
pub fn place_value<G: ObjectGraph + ?Sized>(graph: &G, place: Place) -> Option<Value> {
    match place {
        Place::Holder(holder) => holder_ref(graph, &holder).map(|h| h.snapshot()),
        Place::Member { value, .. } | Place::Detached(value) => Some(value),
    }
}

// ── Walking ─────────────────────────────────────────────────────────

fn walk<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    steps: &[Step],
) -> Result<Option<Place>, ResolveError> {
    if graph.object(root).is_none() {
        return Err(ResolveError::unresolved(
            0,
            "",
            format!("object `{root}` is not registered"),
        ));
    }

    let mut place = Place::Holder(Holder::Object(root.clone()));
    let mut optional = false;
    for (index, step) in steps.iter().enumerate() {
        optional |= step.optional;
        match apply_step(graph, root, place, step) {
            Ok(next) => place = next,
            Err(_) if optional => return Ok(None),
            Err(reason) => return Err(ResolveError::unresolved(index, step.to_string(), reason)),
        }
    }
    Ok(Some(place))
}

fn apply_step<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    place: Place,
    step: &Step,
) -> Result<Place, String> {
    if let StepKind::Object(id) = &step.kind {
        let id = ObjectId::from(id.as_str());
        return match graph.object(&id) {
            Some(_) => Ok(Place::Holder(Holder::Object(id))),
            None => Err(format!("object `{id}` is not registered")),
        };
    }

    match place {
        Place::Holder(holder) => step_on_holder(graph, root, holder, step),
        Place::Member {
            holder,
            member,
            mut keys,
            value,
        } => {
            let (key, next) = step_into_value(&value, step)?;
            keys.push(key);
            Ok(Place::Member {
                holder,
                member,
                keys,
                value: next,
            })
        }
        Place::Detached(value) => step_into_value(&value, step).map(|(_, next)| Place::Detached(next)),
    }
}

fn step_on_holder<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    holder: Holder,
    step: &Step,
) -> Result<Place, String> {
    let owner = holder.object_id().clone();
    match &step.kind {
        StepKind::Member(name) => {
            if matches!(holder, Holder::Object(_)) && graph.component(&owner, name).is_some() {
                return Ok(Place::Holder(Holder::Component(owner, name.clone())));
            }
            read_member(&*graph, holder, name)
        }
        StepKind::Map(key) => read_member(&*graph, holder, key),
        StepKind::Component(name) => match graph.component(&owner, name) {
            Some(_) => Ok(Place::Holder(Holder::Component(owner, name.clone()))),
            None => Err(format!("no component `{name}`")),
        },
        StepKind::Method { name, args } => {
            let args = match args {
                Some(args) => evaluate_args(graph, root, args)?,
                None => Vec::new(),
            };
            let target = holder_mut(graph, &holder)
                .ok_or_else(|| format!("`{owner}` is not registered"))?;
            target
                .call(name, &args)
                .map(Place::Detached)
                .map_err(|e| e.to_string())
        }
        StepKind::Hierarchy(name) => {
            let next = if name == PARENT {
                graph.parent(&owner)
            } else {
                graph.child_named(&owner, name)
            };
            next.map(|id| Place::Holder(Holder::Object(id)))
                .ok_or_else(|| match name.as_str() {
                    PARENT => format!("`{owner}` has no parent"),
                    _ => format!("`{owner}` has no child named `{name}`"),
                })
        }
        StepKind::Index(i) => Err(format!("cannot index into an object with `index:{i}`")),
        StepKind::Object(_) => Err("object steps are handled before dispatch".to_string()),
    }
}

fn read_member<G: ObjectGraph + ?Sized>(graph: &G, holder: Holder, name: &str) -> Result<Place, String> {
    let target = holder_ref(graph, &holder).ok_or_else(|| format!("`{}` is not registered", holder.object_id()))?;
    match target.get(name) {
        Some(value) => Ok(Place::Member {
            holder,
            member: name.to_string(),
            keys: Vec::new(),
            value,
        }),
        None => Err(format!("{} has no member `{name}`", target.type_name())),
    }
}

fn step_into_value(value: &Value, step: &Step) -> Result<(Key, Value), String> {
    match (&step.kind, value) {
        (StepKind::Member(name) | StepKind::Map(name), Value::Object(map)) => map
            .get(name)
            .map(|v| (Key::Field(name.clone()), v.clone()))
            .ok_or_else(|| format!("no key `{name}`")),
        (StepKind::Index(i), Value::Array(items)) => normalize_index(*i, items.len())
            .map(|idx| (Key::Index(idx), items[idx].clone()))
            .ok_or_else(|| format!("index {i} out of range (len {})", items.len())),
        (_, other) => Err(format!("`{step}` cannot be applied to {}", value_kind(other))),
    }
}

fn evaluate_args<G: ObjectGraph + ?Sized>(
    graph: &mut G,
    root: &ObjectId,
    args: &[Arg],
) -> Result<Vec<Value>, String> {
    args.iter()
        .map(|arg| match arg {
            Arg::Literal(value) => Ok(value.clone()),
            Arg::Path(path) => match get_value(graph, root, path) {
                Ok(value) => Ok(value.unwrap_or(Value::Null)),
                Err(e) => Err(format!("argument `{path}`: {e}")),
            },
        })
        .collect()
}

fn holder_ref<'g, G: ObjectGraph + ?Sized>(graph: &'g G, holder: &Holder) -> Option<&'g dyn Accessible> {
    match holder {
        Holder::Object(id) => graph.object(id),
        Holder::Component(id, name) => graph.component(id, name),
    }
}

fn holder_mut<'g, G: ObjectGraph + ?Sized>(
    graph: &'g mut G,
    holder: &Holder,
) -> Option<&'g mut dyn Accessible> {
    match holder {
        Holder::Object(id) => graph.object_mut(id),
        Holder::Component(id, name) => graph.component_mut(id, name),
    }
}

fn navigate_mut<'v>(value: &'v mut Value, keys: &[Key]) -> Option<&'v mut Value> {
    keys.iter().try_fold(value, |current, key| match key {
        Key::Field(name) => current.get_mut(name.as_str()),
        Key::Index(idx) => current.get_mut(*idx),
    })
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    if index < 0 {
        let back = usize::try_from(index.unsigned_abs()).ok()?;
        len.checked_sub(back)
    } else {
        let idx = usize::try_from(index).ok()?;
        (idx < len).then_some(idx)
    }
}

/// Error shaping for the final step of a write.
struct WriteTarget<'a> {
    expr: &'a PathExpression,
    last: &'a Step,
    last_index: usize,
    optional: bool,
}

impl WriteTarget<'_> {
    fn miss(&self, reason: String) -> Result<bool, ResolveError> {
        if self.optional {
            Ok(false)
        } else {
            Err(ResolveError::unresolved(
                self.last_index,
                self.last.to_string(),
                reason,
            ))
        }
    }

    fn not_assignable(&self) -> ResolveError {
        ResolveError::not_writable(
            self.expr.to_string(),
            format!("`{}` is not an assignable step", self.last),
        )
    }

    fn access_failed(&self, err: AccessError) -> Result<bool, ResolveError> {
        match err {
            AccessError::UnknownMember { .. } => self.miss(err.to_string()),
            AccessError::Conversion {
                field,
                expected,
                actual,
            } => Err(ResolveError::Conversion {
                field,
                expected,
                actual,
            }),
            other => Err(ResolveError::not_writable(self.expr.to_string(), other.to_string())),
        }
    }
}
