mod memfs;
