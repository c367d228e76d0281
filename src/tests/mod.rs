mod simple_codecs;
mod sliding_window;
