pub use crate::cc_sequence::{CCSequence, IntoCCSequence};
pub use crate::commandclass::{
    CCAddress, CCAddressable, CCBase, CCEncodingContext, CCId, CCParsable, CCParsingContext,
    CCSession, CCValues, CcOrRaw, Destination, NotImplemented, WithAddress, CC,
};
pub use crate::commandclass_raw::CCRaw;
