use crate::cli::{Session, print_summary};

pub(crate) fn run(session: &mut Session) -> Result<(), String> {
    if session.remove_coupon().is_none() {
        return Err("no coupon is applied".to_string());
    }

    print_summary(session)
}
