use crate::config::{EmptyRollCallPolicy, ParsingConfig};
use crate::types::*;

/// Crosses a record's agenda items with its roll call.
///
/// Each agenda item opens a group. The group's first row carries file,
/// identity, meeting and agenda columns plus the first member's vote; every
/// further member gets a continuation row where only the member columns are
/// set and everything else is `Field::Absent` (optionally except the
/// members column, which then repeats the member's name).
pub struct RowFlattener {
    empty_roll_call: EmptyRollCallPolicy,
    member_name_in_members: bool,
}

impl Default for RowFlattener {
    fn default() -> Self {
        Self::new(EmptyRollCallPolicy::default())
    }
}

impl RowFlattener {
    pub fn new(empty_roll_call: EmptyRollCallPolicy) -> Self {
        Self {
            empty_roll_call,
            member_name_in_members: false,
        }
    }

    pub fn with_member_name_in_members(mut self, enabled: bool) -> Self {
        self.member_name_in_members = enabled;
        self
    }

    pub fn from_config(config: &ParsingConfig) -> Self {
        Self::new(config.flatten.empty_roll_call)
            .with_member_name_in_members(config.flatten.member_name_in_members)
    }

    pub fn flatten(&self, file_name: &str, record: &ProtocolRecord) -> Vec<OutputRow> {
        if record.agenda.is_empty() {
            return Vec::new();
        }

        let (first_member, other_members) = match record.roll_call.split_first() {
            Some((first, rest)) => (Some(first), rest),
            None if self.empty_roll_call == EmptyRollCallPolicy::Omit => return Vec::new(),
            None => (None, &[][..]),
        };

        let mut rows = Vec::with_capacity(record.agenda.len() * (other_members.len() + 1));
        for item in &record.agenda {
            let mut head = Self::meeting_row(file_name, record, item);
            match first_member {
                Some(member) => Self::fill_member(&mut head, member),
                None => Self::fill_member(&mut head, &MemberVote::default()),
            }
            rows.push(head);

            for member in other_members {
                let mut continuation = OutputRow::new();
                Self::fill_member(&mut continuation, member);
                if self.member_name_in_members {
                    continuation.set(Column::Members, Field::text(member.full_name.as_str()));
                }
                rows.push(continuation);
            }
        }

        rows
    }

    fn meeting_row(file_name: &str, record: &ProtocolRecord, item: &AgendaItem) -> OutputRow {
        let meeting = &record.meeting;

        OutputRow::new()
            .with(Column::FileName, Field::text(file_name))
            .with(Column::Date, Field::text(record.identity.date.as_str()))
            .with(Column::ProtocolNumber, Field::text(record.identity.number.as_str()))
            .with(Column::Chair, Field::text(meeting.text(MeetingField::Chair)))
            .with(Column::DeputyChair, Field::text(meeting.text(MeetingField::DeputyChair)))
            .with(Column::Members, Field::text(meeting.text(MeetingField::Members)))
            .with(Column::Secretary, Field::text(meeting.text(MeetingField::Secretary)))
            .with(Column::Absentees, Field::text(meeting.text(MeetingField::Absentees)))
            .with(Column::Invitees, Field::text(meeting.text(MeetingField::Invitees)))
            .with(Column::Quorum, Field::text(meeting.text(MeetingField::Quorum)))
            .with(
                Column::DecisionProcedure,
                Field::text(meeting.text(MeetingField::DecisionProcedure)),
            )
            .with(Column::AgendaText, Field::text(item.text.as_str()))
            .with(Column::Speaker, Field::text(item.speaker.as_str()))
            .with(Column::VotesFor, Field::text(item.votes.in_favor.as_str()))
            .with(Column::VotesAgainst, Field::text(item.votes.against.as_str()))
            .with(Column::VotesAbstain, Field::text(item.votes.abstain.as_str()))
            .with(Column::Decision, Field::text(item.decision.as_str()))
    }

    fn fill_member(row: &mut OutputRow, member: &MemberVote) {
        row.set(Column::MemberName, Field::text(member.full_name.as_str()));
        row.set(Column::MemberFor, Field::text(member.in_favor.as_str()));
        row.set(Column::MemberAgainst, Field::text(member.against.as_str()));
        row.set(Column::MemberAbstain, Field::text(member.abstain.as_str()));
        row.set(Column::MemberNote, Field::text(member.note.as_str()));
    }
}
