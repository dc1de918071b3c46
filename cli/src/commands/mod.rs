mod generate;
mod helpers;
mod pantry;
mod plans;

pub(crate) use generate::cmd_generate;
pub(crate) use pantry::{cmd_add, cmd_pantry_clear, cmd_pantry_list, cmd_pantry_remove};
pub(crate) use plans::{
    cmd_plans_check, cmd_plans_clear, cmd_plans_list, cmd_plans_remove, cmd_plans_show,
};
