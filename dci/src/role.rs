//! Roles and role-binding checks.
//!
//! A role is a named slot on a context that some player object fills for the
//! lifetime of one context instance. Methods written against a role can ask
//! the engine for the current context and verify that they really are the
//! player bound into that slot (see [`Engine::current_bound`]).
//!
//! [`Engine::current_bound`]: crate::engine::Engine::current_bound

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Comparison used by the role-binding check.
///
/// Shared players compare by identity; value-like roles compare by value.
pub trait RoleIdentity {
    /// Returns true if `self` is the player bound into `bound`.
    fn same_player(&self, bound: &Self) -> bool;

    /// Describes the role for error messages.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<P: ?Sized> RoleIdentity for Arc<P> {
    fn same_player(&self, bound: &Self) -> bool {
        same_allocation(self, bound)
    }
}

macro_rules! value_role_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RoleIdentity for $ty {
                fn same_player(&self, bound: &Self) -> bool {
                    self == bound
                }

                fn describe(&self) -> String {
                    format!("{}({self})", std::any::type_name::<Self>())
                }
            }
        )*
    };
}

value_role_identity!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String);

impl RoleIdentity for str {
    fn same_player(&self, bound: &Self) -> bool {
        self == bound
    }
}

/// A role slot holding a shared player.
///
/// `P` is usually a role-contract trait object (`Role<dyn Withdraw>`), so
/// the context only sees the capability the use case needs while the check
/// still compares the concrete player underneath.
pub struct Role<P: ?Sized> {
    name: &'static str,
    player: Arc<P>,
}

impl<P: ?Sized> Role<P> {
    /// Binds a player into a named role.
    #[must_use]
    pub fn bind(name: &'static str, player: Arc<P>) -> Self {
        Self { name, player }
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the bound player.
    #[must_use]
    pub fn player(&self) -> &Arc<P> {
        &self.player
    }

    /// Returns true if `candidate` is the same object as the bound player,
    /// whatever contract it is viewed through.
    #[must_use]
    pub fn is_played_by<Q: ?Sized>(&self, candidate: &Arc<Q>) -> bool {
        same_allocation(&self.player, candidate)
    }
}

fn same_allocation<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

impl<P: ?Sized> RoleIdentity for Role<P> {
    fn same_player(&self, bound: &Self) -> bool {
        bound.is_played_by(&self.player)
    }

    fn describe(&self) -> String {
        self.name.to_string()
    }
}

impl<P: ?Sized> Clone for Role<P> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            player: Arc::clone(&self.player),
        }
    }
}

impl<P: ?Sized> Deref for Role<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.player
    }
}

impl<P: ?Sized> fmt::Debug for Role<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Role")
            .field("name", &self.name)
            .field("player", &Arc::as_ptr(&self.player).cast::<()>())
            .finish()
    }
}
