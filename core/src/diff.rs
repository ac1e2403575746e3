use std::collections::HashSet;

/// Presence set of the track ids currently in a playlist.
pub fn membership(track_ids: &[String]) -> HashSet<&str> {
    track_ids.iter().map(String::as_str).collect()
}

/// Desired tracks that are already playlist members, in desired order.
///
/// The sync deletes these before re-adding the full desired list, which also
/// clears any repeated copies left in the playlist.
pub fn find_duplicates(desired: &[String], members: &HashSet<&str>) -> Vec<String> {
    desired
        .iter()
        .filter(|id| members.contains(id.as_str()))
        .cloned()
        .collect()
}
