use crate::cli::{Session, print_summary};

pub(crate) fn run(session: &mut Session) -> Result<(), String> {
    if session.remove_shipping().is_none() {
        return Err("no shipping is selected".to_string());
    }

    print_summary(session)
}
