use atlas_types::{Actor, Record};

/// Whether `viewer` may see `record` in its current trust state.
///
/// A deterministic projection of current state, recomputed on every read:
/// soft-deleted records are invisible to everyone (the creator included);
/// otherwise creators see their own pending work, admins see everything,
/// and validated records are public.
pub fn is_visible(record: &Record, viewer: &Actor) -> bool {
    if record.is_deleted() {
        return false;
    }
    if viewer.id == record.created_by {
        return true;
    }
    if viewer.is_admin {
        return true;
    }
    record.is_validated
}
