//! Stay Behavior
//!
//! Parks the creature. Claims the move channel so no lower-priority
//! behavior can walk it away while the order is Stay.

use ally_events::AllyCommand;

use crate::nav::LocomotionOrder;

use super::{BodyRef, Ctx};

pub fn can_start(body: &BodyRef) -> bool {
    body.order == Some(AllyCommand::Stay)
}

pub fn on_start(body: &mut BodyRef, ctx: &mut Ctx) {
    ctx.locomotion.push(LocomotionOrder::Stop { entity: body.entity });
}
