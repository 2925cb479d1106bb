use crate::emitter::Emitter;
use crate::utils::MachineState as State;

/// State shared between tokenizer states: the current/return state, the
/// temporary buffer and the numeric character reference accumulator.
#[derive(Debug)]
pub(crate) struct MachineHelper {
    pub(crate) temporary_buffer: String,
    pub(crate) character_reference_code: u32,
    pub(crate) state: State,
    return_state: Option<State>,
}

impl Default for MachineHelper {
    fn default() -> Self {
        MachineHelper {
            temporary_buffer: String::new(),
            character_reference_code: 0,
            state: State::Data,
            return_state: None,
        }
    }
}

impl MachineHelper {
    pub(crate) fn is_consumed_as_part_of_an_attribute(&self) -> bool {
        matches!(
            self.return_state,
            Some(
                State::AttributeValueDoubleQuoted
                    | State::AttributeValueSingleQuoted
                    | State::AttributeValueUnquoted
            )
        )
    }

    pub(crate) fn flush_code_points_consumed_as_character_reference<E: Emitter>(
        &mut self,
        emitter: &mut E,
    ) {
        if self.is_consumed_as_part_of_an_attribute() {
            emitter.push_attribute_value(&self.temporary_buffer);
            self.temporary_buffer.clear();
        } else {
            self.flush_buffer_characters(emitter);
        }
    }

    pub(crate) fn flush_buffer_characters<E: Emitter>(&mut self, emitter: &mut E) {
        emitter.emit_string(&self.temporary_buffer);
        self.temporary_buffer.clear();
    }

    pub(crate) fn enter_state(&mut self, state: State) {
        debug_assert!(self.return_state.is_none());
        self.return_state = Some(self.state);
        self.switch_to(state);
    }

    pub(crate) fn pop_return_state(&mut self) -> State {
        self.return_state.take().unwrap()
    }

    pub(crate) fn exit_state(&mut self) {
        let state = self.pop_return_state();
        self.switch_to(state);
    }

    pub(crate) fn switch_to(&mut self, state: State) {
        log::trace!("tokenizer: {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

macro_rules! mutate_character_reference {
    ($slf:expr, * $mul:literal + $x:ident - $sub:literal) => {
        match $slf
            .helper
            .character_reference_code
            .checked_mul($mul)
            .and_then(|cr| cr.checked_add($x as u32 - $sub))
        {
            Some(cr) => $slf.helper.character_reference_code = cr,
            None => {
                // overflow: park the accumulator above the Unicode range so
                // NumericCharacterReferenceEnd reports out-of-range
                $slf.helper.character_reference_code = 0x11_0000;
            }
        };
    };
}

pub(crate) use mutate_character_reference;

macro_rules! switch_to {
    ($slf:expr, $state:expr) => {{
        $slf.helper.switch_to($state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use switch_to;

macro_rules! enter_state {
    ($slf:expr, $state:expr) => {{
        $slf.helper.enter_state($state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use enter_state;

macro_rules! exit_state {
    ($slf:expr) => {{
        $slf.helper.exit_state();
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use exit_state;

macro_rules! reconsume_in {
    ($slf:expr, $c:expr, $state:expr) => {{
        let new_state = $state;
        let c = $c;
        $slf.input.unread_char(c);
        $slf.helper.switch_to(new_state);
        Ok(ControlToken::Continue)
    }};
}

pub(crate) use reconsume_in;

macro_rules! cont {
    () => {{
        return Ok(ControlToken::Continue);
    }};
}

pub(crate) use cont;

macro_rules! eof {
    () => {{
        Ok(ControlToken::Eof)
    }};
}

pub(crate) use eof;

macro_rules! read_char {
    ($slf:expr) => {
        $slf.input.read_char(&mut $slf.emitter)
    };
}

pub(crate) use read_char;

macro_rules! error {
    ($slf:expr, $e:expr) => {
        $slf.emitter.emit_error(crate::error::ParseError {
            code: $e,
            position: $slf.input.position(),
        });
    };
}

pub(crate) use error;
