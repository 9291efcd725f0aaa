pub mod quickitquote;
